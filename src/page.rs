//! HTML rendering of the dashboard page
//!
//! The page is rendered once per `GET /` from the layout. The initial callback
//! outputs are embedded so the histogram draws without a round trip; later
//! changes go through `/api/update` and table paging through `/api/table`.

use crate::callback::CallbackOutput;
use crate::dashboard::Dashboard;
use crate::error::{Error, Result};
use crate::layout::Component;
use std::fmt::Write;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const PAGE_STYLE: &str = r#"
        :root {
            --bg: #f5f5f7;
            --card: #ffffff;
            --border: #d2d2d7;
            --text: #1d1d1f;
            --dim: #86868b;
            --accent: #007aff;
            --shadow: 0 2px 8px rgba(0,0,0,0.08), 0 1px 2px rgba(0,0,0,0.04);
        }
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Helvetica Neue', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            margin: 0;
            line-height: 1.5;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        h3 { color: var(--dim); font-weight: 400; margin-top: 0; }
        .graph, .data-table {
            background: var(--card);
            border-radius: 16px;
            padding: 1.5rem;
            box-shadow: var(--shadow);
            margin-bottom: 1.5rem;
        }
        .radio-items { margin-bottom: 1.5rem; }
        .radio-items label { margin-right: 1.25rem; cursor: pointer; }
        table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
        th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid var(--border); text-align: left; }
        th { cursor: pointer; user-select: none; white-space: nowrap; }
        th .dir { color: var(--accent); margin-left: 0.25rem; }
        td.numeric { text-align: right; font-variant-numeric: tabular-nums; }
        tr.filters input { width: 100%; font-size: 0.8125rem; padding: 0.2rem 0.3rem; border: 1px solid var(--border); border-radius: 4px; }
        .pager { display: flex; gap: 0.75rem; align-items: center; justify-content: flex-end; margin-top: 0.75rem; color: var(--dim); }
        .pager button { border: 1px solid var(--border); background: var(--card); border-radius: 6px; padding: 0.2rem 0.6rem; cursor: pointer; }
"#;

const PAGE_SCRIPT: &str = r#"
(function () {
    const state = JSON.parse(document.getElementById('dashboard-state').textContent);

    function draw(outputs) {
        for (const out of outputs) {
            const el = document.getElementById(out.output);
            if (el) { Plotly.react(el, out.figure.data, out.figure.layout); }
        }
    }

    async function update(input, value) {
        const res = await fetch('/api/update', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ input: input, value: value })
        });
        const body = await res.json();
        if (body.ok) { draw(body.data); } else { console.error(body.error); }
    }

    document.querySelectorAll('.radio-items').forEach(function (group) {
        group.addEventListener('change', function (ev) { update(group.id, ev.target.value); });
    });

    function setupTable(root) {
        const query = { sort: '', dir: 'asc', page: 0, filters: {} };
        const head = root.querySelector('thead');
        const body = root.querySelector('tbody');
        const pager = root.querySelector('.pager span');

        async function load() {
            const params = new URLSearchParams();
            if (query.sort) { params.set('sort', query.sort); params.set('dir', query.dir); }
            params.set('page', query.page);
            for (const [col, text] of Object.entries(query.filters)) {
                if (text) { params.set('filter_' + col, text); }
            }
            const res = await fetch('/api/table?' + params.toString());
            const reply = await res.json();
            if (!reply.ok) { console.error(reply.error); return; }
            const page = reply.data;
            query.page = page.page;
            body.innerHTML = '';
            for (const row of page.rows) {
                const tr = document.createElement('tr');
                row.forEach(function (cell, i) {
                    const td = document.createElement('td');
                    td.textContent = cell === null ? '' : cell;
                    if (page.columns[i].type === 'numeric') { td.className = 'numeric'; }
                    tr.appendChild(td);
                });
                body.appendChild(tr);
            }
            head.querySelectorAll('th').forEach(function (th) {
                const mark = th.querySelector('.dir');
                mark.textContent = th.dataset.col === query.sort ? (query.dir === 'asc' ? '▲' : '▼') : '';
            });
            pager.textContent = 'Page ' + (page.page + 1) + ' of ' + page.page_count + ' (' + page.total_rows + ' rows)';
        }

        head.querySelectorAll('th').forEach(function (th) {
            th.addEventListener('click', function () {
                const col = th.dataset.col;
                if (query.sort === col) {
                    query.dir = query.dir === 'asc' ? 'desc' : 'asc';
                } else {
                    query.sort = col;
                    query.dir = 'asc';
                }
                load();
            });
        });
        head.querySelectorAll('tr.filters input').forEach(function (input) {
            input.addEventListener('change', function () {
                query.filters[input.dataset.col] = input.value;
                query.page = 0;
                load();
            });
        });
        root.querySelector('.prev').addEventListener('click', function () {
            if (query.page > 0) { query.page -= 1; load(); }
        });
        root.querySelector('.next').addEventListener('click', function () {
            query.page += 1;
            load();
        });
        load();
    }

    document.querySelectorAll('.data-table').forEach(setupTable);
    draw(state.outputs);
})();
"#;

/// Render the full page, running every callback once for its initial output.
pub fn render(dashboard: &Dashboard) -> Result<String> {
    let outputs = dashboard.initial_outputs()?;
    render_with_outputs(dashboard, &outputs).map_err(Error::Render)
}

fn render_with_outputs(
    dashboard: &Dashboard,
    outputs: &[CallbackOutput],
) -> std::result::Result<String, std::fmt::Error> {
    let layout = dashboard.layout();
    let mut body = String::new();
    for component in &layout.components {
        render_component(&mut body, component)?;
    }

    let state = serde_json::json!({ "outputs": outputs });

    let mut html = String::new();
    write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly}"></script>
    <style>{style}</style>
</head>
<body>
<div class="container">
{body}</div>
<script id="dashboard-state" type="application/json">{state}</script>
<script>{script}</script>
</body>
</html>
"#,
        title = escape_html(&layout.title),
        plotly = PLOTLY_JS,
        style = PAGE_STYLE,
        body = body,
        state = script_safe_json(&state),
        script = PAGE_SCRIPT,
    )?;
    Ok(html)
}

fn render_component<W: Write>(out: &mut W, component: &Component) -> std::fmt::Result {
    match component {
        Component::Heading { level, text } => {
            writeln!(out, "<h{level}>{}</h{level}>", escape_html(text))
        }
        Component::Graph { id } => {
            writeln!(out, r#"<div class="graph" id="{}"></div>"#, escape_html(id))
        }
        Component::RadioItems { id, options, value } => {
            writeln!(out, r#"<div class="radio-items" id="{}">"#, escape_html(id))?;
            for option in options {
                let checked = if option == value { " checked" } else { "" };
                writeln!(
                    out,
                    r#"  <label><input type="radio" name="{id}" value="{opt}"{checked}> {opt}</label>"#,
                    id = escape_html(id),
                    opt = escape_html(option),
                    checked = checked,
                )?;
            }
            writeln!(out, "</div>")
        }
        Component::DataTable {
            id,
            columns,
            page_size,
            ..
        } => {
            writeln!(
                out,
                r#"<div class="data-table" id="{}" data-page-size="{}">"#,
                escape_html(id),
                page_size
            )?;
            writeln!(out, "<table>\n<thead>\n<tr>")?;
            for col in columns {
                writeln!(
                    out,
                    r#"  <th data-col="{}">{}<span class="dir"></span></th>"#,
                    escape_html(&col.id),
                    escape_html(&col.name)
                )?;
            }
            writeln!(out, "</tr>\n<tr class=\"filters\">")?;
            for col in columns {
                writeln!(
                    out,
                    r#"  <th><input type="text" data-col="{}" placeholder="filter data..."></th>"#,
                    escape_html(&col.id)
                )?;
            }
            writeln!(out, "</tr>\n</thead>\n<tbody></tbody>\n</table>")?;
            writeln!(
                out,
                r#"<div class="pager"><button class="prev">&lsaquo;</button><span></span><button class="next">&rsaquo;</button></div>
</div>"#
            )
        }
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON that can sit inside a `<script>` element
fn script_safe_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}
