pub fn app_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Site Replication Status</title>
    <style>
                body { font-family: system-ui, sans-serif; margin: 1.5rem; background: #fafafa; }
                main { max-width: 960px; margin: 0 auto; }
                section { background: #fff; border: 1px solid #ddd; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
                h1, h2 { margin-top: 0; }
                label { display: block; margin: 0.4rem 0 0.2rem; font-weight: 600; }
                input, select, button { font: inherit; }
                input, select { padding: 0.5rem; border: 1px solid #ccc; border-radius: 6px; box-sizing: border-box; }
                .cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 0.75rem; }
                .card { border: 1px solid #e2e2e2; border-radius: 6px; padding: 0.6rem; }
                .card h3 { margin: 0 0 0.4rem; font-size: 1rem; }
                .actions { margin-top: 0.6rem; display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: end; }
                button { padding: 0.5rem 0.8rem; border: 1px solid #888; border-radius: 6px; background: #f5f5f5; cursor: pointer; }
                .status-table { border-collapse: collapse; margin-top: 0.8rem; }
                .status-table th, .status-table td { border: 1px solid #ddd; padding: 0.35rem 0.7rem; text-align: center; }
                .status-table th:first-child { text-align: left; }
                .ok { color: #2e7d32; }
                .fail { color: #c62828; }
                .muted { color: #666; font-size: 0.92rem; }
                #snackbar { display: none; position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); background: #c62828; color: #fff; padding: 0.7rem 1rem; border-radius: 6px; cursor: pointer; }
    </style>
</head>
<body>
    <main>
        <h1>Site Replication Status</h1>

                <section>
                        <h2>Replication Summary</h2>
                        <div class="cards" id="summary-cards"><p class="muted">(loading)</p></div>
                        <div class="actions"><button onclick="refreshSummary()">Refresh</button></div>
                </section>

                <section>
                        <h2>Entity Status</h2>
                        <p class="muted">Compare one entity across every site.</p>
                        <div class="actions">
                                <div>
                                        <label for="entity-type">View replication status for</label>
                                        <select id="entity-type">
                                                <option value="bucket">Bucket</option>
                                                <option value="user">User</option>
                                                <option value="group">Group</option>
                                                <option value="policy">Policy</option>
                                        </select>
                                </div>
                                <div>
                                        <label for="entity-value">Name</label>
                                        <input id="entity-value" placeholder="Enter a bucket name" />
                                </div>
                                <button onclick="viewEntity()">View</button>
                        </div>
                        <div id="lookup-output"></div>
                </section>

                <section>
                        <h2>Sites</h2>
                        <div class="actions"><button onclick="fetchSites()">Show Sites</button></div>
                        <div id="sites-output"></div>
                </section>
    </main>
    <div id="snackbar" onclick="dismissSnackbar()"></div>

        <script>
            async function fetchJson(url) {
                const response = await fetch(url);
                const payload = await response.json();
                if (!response.ok) {
                    throw new Error(payload.error || `HTTP ${response.status}`);
                }
                return payload;
            }

            function showSnackbar(message) {
                const bar = document.getElementById('snackbar');
                bar.textContent = message;
                bar.style.display = 'block';
            }

            function dismissSnackbar() {
                document.getElementById('snackbar').style.display = 'none';
            }

            function text(value) {
                const span = document.createElement('span');
                span.textContent = value;
                return span.innerHTML;
            }

            function renderCards(summary) {
                const cards = summary.map((card) => `
                    <div class="card">
                        <h3>${text(card.label)}</h3>
                        <div title="${text(card.syncedText)}">Synced: ${text(card.syncedShort)}</div>
                        <div>Failed: ${card.failed}</div>
                    </div>`);
                document.getElementById('summary-cards').innerHTML = cards.join('');
            }

            async function refreshSummary() {
                try {
                    const payload = await fetchJson('/api/replication/summary');
                    renderCards(payload.summary);
                } catch (err) {
                    renderCards([]);
                    showSnackbar(err.message);
                }
            }

            async function viewEntity() {
                const entityType = document.getElementById('entity-type').value;
                const entityValue = document.getElementById('entity-value').value;
                const output = document.getElementById('lookup-output');
                const params = new URLSearchParams({ entityType, entityValue });
                output.innerHTML = '<p class="muted">(loading)</p>';
                try {
                    const payload = await fetchJson(`/api/replication/lookup?${params}`);
                    output.innerHTML = payload.found ? payload.table : `<p>${text(payload.message)}</p>`;
                } catch (err) {
                    output.innerHTML = '';
                    showSnackbar(err.message);
                }
            }

            async function fetchSites() {
                const output = document.getElementById('sites-output');
                try {
                    const info = await fetchJson('/api/replication/sites');
                    if (!info.enabled) {
                        output.innerHTML = '<p class="muted">Site replication is not enabled.</p>';
                        return;
                    }
                    const rows = info.sites.map((site) =>
                        `<li>${text(site.name)} <span class="muted">${text(site.endpoint)} (${text(site.deploymentID)})</span></li>`);
                    output.innerHTML = `<ul>${rows.join('')}</ul>`;
                } catch (err) {
                    showSnackbar(err.message);
                }
            }

            document.getElementById('entity-type').addEventListener('change', (event) => {
                const label = event.target.selectedOptions[0].textContent.toLowerCase();
                document.getElementById('entity-value').placeholder = `Enter a ${label} name`;
            });

            refreshSummary();
        </script>
</body>
</html>
"#
    .to_string()
}
