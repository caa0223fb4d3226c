//! GET /: the recruiter upload page.
//!
//! One static page: the form posts to `/api/v1/match` for the results table and
//! summary tiles, or straight to `/api/v1/match/export` for the CSV download.

use axum::{extract::State, response::Html};

use crate::state::AppState;

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Matchboard</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 72rem; color: #1f2933; }
  fieldset { border: 1px solid #cbd2d9; padding: 1rem; margin-bottom: 1rem; }
  label { display: inline-block; margin-right: 1rem; }
  table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
  th, td { border-bottom: 1px solid #e4e7eb; padding: .4rem .6rem; text-align: left; }
  .tiles { display: flex; gap: 1rem; margin-top: 1rem; }
  .tile { background: #f5f7fa; padding: .8rem 1.2rem; border-radius: 6px; }
  .High { color: #b42318; } .Medium { color: #b54708; } .Low { color: #027a48; }
</style>
</head>
<body>
<h1>Matchboard</h1>
<form id="match-form" method="post" action="/api/v1/match/export" enctype="multipart/form-data">
<fieldset>
  <legend>Resumes</legend>
  <input type="file" name="resumes" accept=".pdf,.txt,.md" multiple required>
</fieldset>
<fieldset>
  <legend>Jobs</legend>
  <label><input type="radio" name="scope" value="best_job" checked> Best job per candidate</label>
  <label><input type="radio" name="scope" value="single_job"> Single job:</label>
  <select name="job_title">
"#;

const PAGE_TAIL: &str = r#"  </select>
</fieldset>
<fieldset>
  <legend>Matching</legend>
  <label><input type="radio" name="mode" value="overall" checked> Overall</label>
  <label><input type="radio" name="mode" value="field"> Field:</label>
  <select name="field">
    <option value="roles_responsibility">Roles &amp; responsibility</option>
    <option value="skills_required">Skills required</option>
  </select>
  <label><input type="checkbox" name="split_skills" value="true"> Score skills individually</label>
</fieldset>
<button type="button" id="run">Rank candidates</button>
<button type="submit">Download CSV</button>
</form>
<div class="tiles" id="tiles"></div>
<table id="results"></table>
<script>
const COLUMNS = ["rank", "candidate", "job_title", "match_score", "skill_score",
  "experience_score", "career_gap_months", "job_hopping", "avg_tenure_months", "risk_level"];
const HEADINGS = ["Rank", "Candidate", "Job", "Match", "Skill", "Experience",
  "Gap (months)", "Job hopping", "Avg tenure", "Risk"];

// Candidate names come from upload file names; only ever assign them as text.
function cell(tag, text, className) {
  const el = document.createElement(tag);
  el.textContent = String(text);
  if (className) el.className = className;
  return el;
}

function tile(label, value) {
  const el = cell("div", label, "tile");
  el.appendChild(document.createElement("br"));
  el.appendChild(cell("b", value));
  return el;
}

document.getElementById("run").addEventListener("click", async () => {
  const form = document.getElementById("match-form");
  const response = await fetch("/api/v1/match", { method: "POST", body: new FormData(form) });
  const body = await response.json();
  const tiles = document.getElementById("tiles");
  const table = document.getElementById("results");
  tiles.replaceChildren();
  table.replaceChildren();
  if (!response.ok) {
    tiles.textContent = body.error.message;
    return;
  }
  const s = body.summary;
  tiles.append(
    tile("Candidates", s.total_candidates),
    tile("Average match", s.average_match_score),
    tile("High risk rows", s.high_risk_rows),
    tile("Failed uploads", body.failures.length));
  const head = document.createElement("tr");
  HEADINGS.forEach(h => head.appendChild(cell("th", h)));
  table.appendChild(head);
  for (const r of body.results) {
    const row = document.createElement("tr");
    for (const key of COLUMNS) {
      if (key === "job_hopping") {
        row.appendChild(cell("td", r.job_hopping ? "Yes" : "No"));
      } else if (key === "risk_level") {
        row.appendChild(cell("td", r.risk_level, r.risk_level));
      } else {
        row.appendChild(cell("td", r[key]));
      }
    }
    table.appendChild(row);
  }
});
</script>
</body>
</html>
"#;

pub async fn dashboard_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_dashboard(&state.jobs.titles()))
}

fn render_dashboard(titles: &[&str]) -> String {
    let mut page = String::from(PAGE_HEAD);
    for title in titles {
        let title = escape_html(title);
        page.push_str(&format!("    <option value=\"{title}\">{title}</option>\n"));
    }
    page.push_str(PAGE_TAIL);
    page
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
