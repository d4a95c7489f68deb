use crate::models::DashboardView;

pub fn render_daybreak_page(view: &DashboardView, context_path: &str) -> String {
    let view_json = serde_json::to_string(view)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");
    let base_json = serde_json::to_string(context_path).unwrap_or_else(|_| "\"\"".to_string());

    DAYBREAK_HTML
        .replace("{{TITLE}}", &escape_html(view.title))
        .replace("{{START_MONTH_OPTIONS}}", &month_options(view, view.range.start_month.value))
        .replace("{{END_MONTH_OPTIONS}}", &month_options(view, view.range.end_month.value))
        .replace("{{START_YEAR_OPTIONS}}", &year_options(view, view.range.start_year.value))
        .replace("{{END_YEAR_OPTIONS}}", &year_options(view, view.range.end_year.value))
        .replace("{{BASE_PATH}}", &base_json)
        .replace("{{INITIAL_VIEW}}", &view_json)
}

fn month_options(view: &DashboardView, selected: u32) -> String {
    view.months
        .iter()
        .map(|month| {
            let marker = if month.value == selected { " selected" } else { "" };
            format!(r#"<option value="{}"{marker}>{}</option>"#, month.value, month.name)
        })
        .collect()
}

fn year_options(view: &DashboardView, selected: i32) -> String {
    let mut options: String = view
        .years
        .iter()
        .map(|year| {
            let marker = if year.value == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{marker}>{0}</option>"#, year.value)
        })
        .collect();
    if !view.years.iter().any(|year| year.value == selected) {
        options.push_str(&format!(r#"<option value="{selected}" selected>{selected}</option>"#));
    }
    options
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const DAYBREAK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --ink: #2b2a28;
      --muted: #6f6a63;
      --card: #ffffff;
      --line: #dddddd;
      --new: #d9534f;
      --closed: #2e8b57;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: #f4f4f2;
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px;
    }

    main {
      max-width: 1100px;
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .card {
      background: var(--card);
      border-radius: 12px;
      padding: 18px 22px;
      box-shadow: 0 8px 24px rgba(0, 0, 0, 0.06);
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      align-items: center;
    }

    select {
      padding: 6px 8px;
      border-radius: 6px;
      border: 1px solid var(--line);
      font: inherit;
    }

    .reportChart {
      height: 300px;
      width: 100%;
      visibility: visible;
    }

    .reportChart.hidden {
      height: 0;
      width: 0%;
      visibility: hidden;
    }

    svg text {
      font-size: 11px;
      fill: var(--muted);
    }

    .grid {
      stroke: var(--line);
      stroke-dasharray: 8 4;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 8px;
      border-bottom: 1px solid var(--line);
      vertical-align: top;
    }

    .new-error { color: var(--new); }
    .closed-error { color: var(--closed); }
    .existing-error { color: var(--muted); }
    .icon-arrow-up2::after { content: " \25B2"; }
    .icon-arrow-down2::after { content: " \25BC"; }
    .icon-minus3::after { content: " \2013"; }
    .reportEntryDiffHidden { display: none; }
    .reportEntryDiffPositive { color: var(--new); }
    .reportEntryDiffNegative { color: var(--closed); }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>{{TITLE}}</h1>
      <p class="status" id="status"></p>
    </header>

    <section class="card filters">
      <label>From
        <select id="startMonth" name="startMonth">{{START_MONTH_OPTIONS}}</select>
        <select id="startYear" name="startYear">{{START_YEAR_OPTIONS}}</select>
      </label>
      <label>To
        <select id="endMonth" name="endMonth">{{END_MONTH_OPTIONS}}</select>
        <select id="endYear" name="endYear">{{END_YEAR_OPTIONS}}</select>
      </label>
      <label>Chart
        <select id="chartView">
          <option value="openClosed">Open / Closed</option>
          <option value="errorType">Error Type</option>
          <option value="hidden">Hidden</option>
        </select>
      </label>
      <span id="rangeLabel"></span>
    </section>

    <section class="card">
      <svg id="report-chart-area" class="reportChart" viewBox="0 0 900 300" role="img" aria-label="Mismatch counts"></svg>
    </section>

    <section class="card">
      <table>
        <thead>
          <tr><th>Report</th><th>Mismatches</th><th>By type</th></tr>
        </thead>
        <tbody id="reportRows"></tbody>
      </table>
    </section>
  </main>

  <script>
    const basePath = {{BASE_PATH}};
    const chartEl = document.getElementById('report-chart-area');
    const rowsEl = document.getElementById('reportRows');
    const statusEl = document.getElementById('status');
    const rangeLabelEl = document.getElementById('rangeLabel');
    const pickers = ['startMonth', 'startYear', 'endMonth', 'endYear'].map((id) => document.getElementById(id));
    const chartViewEl = document.getElementById('chartView');
    const palette = ['#6BFFF5', '#FF6B75', '#FFB44A', '#8E7CC3', '#76A5AF', '#F6B26B', '#93C47D'];
    let pageId = null;

    const setStatus = (message) => {
      statusEl.textContent = message;
    };

    const escapeText = (value) => String(value)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;');

    const showChart = () => chartEl.classList.remove('hidden');
    const hideChart = () => chartEl.classList.add('hidden');

    const drawStackedArea = (chart) => {
      const categories = chart.categories;
      if (!categories.length) {
        chartEl.innerHTML = '<text x="50%" y="50%" text-anchor="middle">No reports in this range</text>';
        return;
      }

      const width = 900;
      const height = 300;
      const left = 48;
      const right = 20;
      const top = 20;
      const bottom = 48;
      const colors = chart.colors.length ? chart.colors : palette;

      // First series sits on top of the stack.
      const layers = chart.series.slice().reverse();
      const totals = categories.map((_, i) => layers.reduce((sum, s) => sum + (s.data[i] || 0), 0));
      const max = Math.max(1, ...totals);
      const xStep = categories.length > 1 ? (width - left - right) / (categories.length - 1) : 0;
      const x = (i) => left + i * xStep;
      const y = (v) => height - bottom - (v / max) * (height - top - bottom);

      let base = categories.map(() => 0);
      let areas = '';
      layers.forEach((series, layerIndex) => {
        const next = base.map((v, i) => v + (series.data[i] || 0));
        const upper = next.map((v, i) => `${x(i).toFixed(1)},${y(v).toFixed(1)}`);
        const lower = base.map((v, i) => `${x(i).toFixed(1)},${y(v).toFixed(1)}`).reverse();
        const color = colors[(layers.length - 1 - layerIndex) % colors.length];
        areas += `<polygon points="${upper.concat(lower).join(' ')}" fill="${color}" fill-opacity="0.85"><title>${escapeText(series.name)}</title></polygon>`;
        base = next;
      });

      let grid = '';
      for (let t = 0; t <= 4; t += 1) {
        const value = Math.round((max * t) / 4);
        grid += `<line class="grid" x1="${left}" x2="${width - right}" y1="${y(value)}" y2="${y(value)}" />`;
        grid += `<text x="${left - 8}" y="${y(value) + 4}" text-anchor="end">${value}</text>`;
      }

      const labelEvery = Math.max(1, Math.ceil(categories.length / 8));
      const labels = categories
        .map((label, i) => (i % labelEvery === 0
          ? `<text x="${x(i)}" y="${height - bottom + 18}" text-anchor="middle">${escapeText(label)}</text>`
          : ''))
        .join('');

      const legend = chart.series
        .map((series, i) => `<text x="${left + i * 140}" y="${height - 8}" style="fill:${colors[i % colors.length]}">&#9632; ${escapeText(series.name)}</text>`)
        .join('');

      chartEl.innerHTML = grid + areas + labels + legend;
    };

    const renderRows = (reports) => {
      rowsEl.innerHTML = reports.map((report) => {
        const types = report.types
          .filter((cell) => cell.total > 0 || cell.delta !== 0)
          .map((cell) => `${escapeText(cell.mismatch_type)}: ${cell.total} <span class="${cell.delta_class}">${cell.delta_abs}</span>`)
          .join('<br/>');
        return `<tr>
          <td>${escapeText(report.label)}</td>
          <td>${report.total_mismatches} <span class="${report.total_diff_class}">${report.total_diff}</span></td>
          <td>${types}</td>
        </tr>`;
      }).join('');
    };

    const render = (view) => {
      pageId = view.page;
      rangeLabelEl.textContent = `${view.range.start_date} to ${view.range.end_date} (${view.report_count} reports)`;
      pickers[0].value = view.range.start_month.value;
      pickers[1].value = view.range.start_year.value;
      pickers[2].value = view.range.end_month.value;
      pickers[3].value = view.range.end_year.value;
      chartViewEl.value = view.chart.view;
      if (view.chart.visible) {
        showChart();
        drawStackedArea(view.chart);
      } else {
        hideChart();
      }
      renderRows(view.reports);
    };

    const post = async (path, body) => {
      const query = pageId ? `?page=${encodeURIComponent(pageId)}` : '';
      const res = await fetch(`${basePath}${path}${query}`, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      render(await res.json());
    };

    pickers.forEach((picker) => {
      picker.addEventListener('change', () => {
        setStatus('Loading...');
        post('/api/daybreak/range', {
          startMonth: Number(pickers[0].value),
          startYear: Number(pickers[1].value),
          endMonth: Number(pickers[2].value),
          endYear: Number(pickers[3].value)
        })
          .then(() => setStatus(''))
          .catch((err) => setStatus(err.message));
      });
    });

    chartViewEl.addEventListener('change', () => {
      post('/api/daybreak/chart-view', { mode: chartViewEl.value }).catch((err) => setStatus(err.message));
    });

    const initialView = {{INITIAL_VIEW}};
    if (initialView) {
      render(initialView);
    }
  </script>
</body>
</html>
"#;
