//! HTML reporter: self-contained pages with click-to-sort tables
//!
//! Rows are rendered in the sorter's current order. Every body cell carries
//! its precomputed sort key in `data-key`, and a small vanilla JS sorter
//! reorders whole rows on header clicks using the same ordering rules as
//! [`crate::table::compare_keys`]: a stable sort, unparseable cells last when
//! ascending, descending being the exact reverse.

use crate::coverage::{cli_own_row, index_row};
use crate::table::{
    ColumnKind, ColumnLayout, Row, SortDirection, SortKey, Table, TableError, TableSorter,
    NOT_APPLICABLE_TOKENS,
};
use crate::{ColorThresholds, CoverageColor, CoverageLevel, CoverageSummary, ModuleCoverage, Percentage};
use chrono::{DateTime, Local};
use std::fmt::Write;

const DEFAULT_TITLE: &str = "Command Test Coverage";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escapes text for HTML element content and quoted attribute values
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reporter that renders the index, CLI-owned and per-module pages
pub struct HtmlReporter {
    title: String,
    thresholds: ColorThresholds,
    generated_at: String,
}

impl HtmlReporter {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            thresholds: ColorThresholds::default(),
            generated_at: Local::now().format(DATE_FORMAT).to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_thresholds(mut self, thresholds: ColorThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Fix the "generated at" timestamp shown on every page
    pub fn with_date(mut self, date: DateTime<Local>) -> Self {
        self.generated_at = date.format(DATE_FORMAT).to_string();
        self
    }

    /// Index page: every included module, in the sorter's row order
    pub fn index_page(&self, summary: &CoverageSummary, sorter: &TableSorter) -> String {
        let mut body = self.heading(&self.title, summary.level);
        self.push_total_line(&mut body, &summary.total);
        body.push_str(&self.table_html(sorter, Some(index_row(&summary.total))));
        self.page(&self.title, &body)
    }

    /// CLI-owned modules page (positional column ids, extra rounded column)
    pub fn cli_own_page(&self, summary: &CoverageSummary, sorter: &TableSorter) -> String {
        let title = format!("{} (CLI-owned modules)", self.title);
        let mut body = self.heading(&title, summary.level);
        self.push_total_line(&mut body, &summary.total);
        body.push_str(&self.table_html(sorter, Some(cli_own_row(&summary.total))));
        let _ = writeln!(body, "<p class=\"nav\"><a href=\"index.html\">All modules</a></p>");
        self.page(&title, &body)
    }

    /// Detail page listing one module's untested commands
    pub fn module_page(&self, module: &ModuleCoverage, level: CoverageLevel) -> Result<String, TableError> {
        let layout = ColumnLayout::indexed(&[("Untested Command", ColumnKind::Text)]);
        let rows = module
            .untested_commands
            .iter()
            .map(|c| Row::new(vec![c.clone()]))
            .collect();
        let mut sorter = TableSorter::new(Table::with_rows(layout, rows)?);
        sorter.sort_by("th0", SortDirection::Ascending)?;

        let title = format!("{}: {}", self.title, module.module);
        let mut body = self.heading(&title, level);
        self.push_total_line(&mut body, module);
        if module.untested_commands.is_empty() {
            let _ = writeln!(body, "<p class=\"empty\">No untested commands listed.</p>");
        } else {
            body.push_str(&self.table_html(&sorter, None));
        }
        let _ = writeln!(body, "<p class=\"nav\"><a href=\"index.html\">Back to index</a></p>");
        Ok(self.page(&title, &body))
    }

    fn heading(&self, title: &str, level: CoverageLevel) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<header>");
        let _ = writeln!(out, "<h1>{}</h1>", escape_html(title));
        let _ = writeln!(
            out,
            "<p class=\"meta\">{} coverage &middot; generated {}</p>",
            level.description(),
            escape_html(&self.generated_at)
        );
        let _ = writeln!(out, "</header>");
        out
    }

    fn push_total_line(&self, out: &mut String, m: &ModuleCoverage) {
        let percentage = m.percentage();
        let _ = writeln!(
            out,
            "<p class=\"summary\">{} tested, {} untested, <span class=\"{}\">{}</span></p>",
            m.tested,
            m.untested,
            self.color_class(percentage),
            percentage
        );
    }

    /// Sortable table: header row, body rows in current order, optional total row
    fn table_html(&self, sorter: &TableSorter, total: Option<Row>) -> String {
        let table = sorter.table();
        let layout = table.layout();
        let mut out = String::with_capacity(4096);

        out.push_str("<table class=\"sortable\">\n<thead><tr>");
        for column in layout.columns() {
            let aria = match sorter.last_sorted() {
                Some((id, SortDirection::Ascending)) if id == column.id => " aria-sort=\"ascending\"",
                Some((id, SortDirection::Descending)) if id == column.id => " aria-sort=\"descending\"",
                _ => "",
            };
            let _ = write!(
                out,
                "<th id=\"{id}\" class=\"{class}\" data-kind=\"{kind}\"{aria} onclick=\"sortTable(this)\">{title}</th>",
                id = escape_html(&column.id),
                class = sorter.direction(&column.id).css_class(),
                kind = column.kind,
                aria = aria,
                title = escape_html(&column.title),
            );
        }
        out.push_str("</tr></thead>\n<tbody>\n");

        for row in table.rows() {
            out.push_str("<tr>");
            for (column, cell) in layout.columns().iter().zip(row.cells()) {
                let key = SortKey::extract(column.kind, cell).to_attr();
                let class = match column.kind {
                    ColumnKind::Percentage => self
                        .cell_color(cell)
                        .map(|c| format!(" class=\"{}\"", c))
                        .unwrap_or_default(),
                    ColumnKind::Numeric => " class=\"num\"".to_string(),
                    ColumnKind::Text => String::new(),
                };
                let content = if column.link {
                    format!(
                        "<a href=\"{}\">{}</a>",
                        escape_html(&urlencoding::encode(cell)),
                        escape_html(cell)
                    )
                } else {
                    escape_html(cell)
                };
                let _ = write!(
                    out,
                    "<td name=\"{}\" data-key=\"{}\"{}>{}</td>",
                    escape_html(&column.id),
                    escape_html(&key),
                    class,
                    content
                );
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");

        if let Some(total) = total {
            out.push_str("<tfoot><tr>");
            for (column, cell) in layout.columns().iter().zip(total.cells()) {
                if column.link {
                    out.push_str("<td></td>");
                    continue;
                }
                let class = match column.kind {
                    ColumnKind::Percentage => self
                        .cell_color(cell)
                        .map(|c| format!(" class=\"{}\"", c))
                        .unwrap_or_default(),
                    ColumnKind::Numeric => " class=\"num\"".to_string(),
                    ColumnKind::Text => String::new(),
                };
                let _ = write!(out, "<td{}>{}</td>", class, escape_html(cell));
            }
            out.push_str("</tr></tfoot>\n");
        }
        out.push_str("</table>\n");
        out
    }

    fn cell_color(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if NOT_APPLICABLE_TOKENS.contains(&raw) {
            return Some(self.color_class(Percentage::NotApplicable));
        }
        match SortKey::extract(ColumnKind::Percentage, raw) {
            SortKey::Percent(v) => Some(self.color_class(Percentage::Value(v))),
            _ => None,
        }
    }

    fn color_class(&self, percentage: Percentage) -> String {
        match CoverageColor::for_percentage(percentage, &self.thresholds) {
            CoverageColor::NotApplicable => "c-na".to_string(),
            color => format!("c-{}", color),
        }
    }

    fn page(&self, title: &str, body: &str) -> String {
        let mut html = String::with_capacity(8192 + body.len());
        html.push_str(Self::template_head());
        html.push_str("<title>");
        html.push_str(&escape_html(title));
        html.push_str("</title>\n");
        html.push_str(Self::template_style());
        html.push_str("</head>\n<body>\n<main>\n");
        html.push_str(body);
        html.push_str("</main>\n");
        html.push_str(Self::template_script());
        html.push_str("</body>\n</html>\n");
        html
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_head() -> &'static str {
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
"##
    }

    fn template_style() -> &'static str {
        r##"<style>
:root{--bg:#fafafa;--surface:#fff;--border:#e4e4e7;--text:#18181b;--muted:#71717a;--red:#ef4444;--orange:#f97316;--green:#22c55e;--blue:#3b82f6;--gold:#ca8a04;--radius:8px}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Oxygen,sans-serif;background:var(--bg);color:var(--text);line-height:1.5}
main{max-width:960px;margin:0 auto;padding:1.5rem}
header{margin-bottom:1rem}
header h1{font-size:1.25rem;font-weight:700}
header .meta,.nav,.empty{font-size:.8125rem;color:var(--muted)}
.summary{margin-bottom:1rem;font-size:.875rem}
.nav{margin-top:1rem}

/* ── Table ── */
table.sortable{width:100%;border-collapse:collapse;background:var(--surface);border:1px solid var(--border);border-radius:var(--radius)}
th,td{padding:.45rem .75rem;border-bottom:1px solid var(--border);text-align:left;font-size:.875rem}
td.num{text-align:right;font-variant-numeric:tabular-nums}
th{cursor:pointer;user-select:none;background:#f4f4f5;white-space:nowrap}
th:hover{background:#e4e4e7}
th[aria-sort]::after{display:inline-block;margin-left:.4rem;font-size:.7rem}
th[aria-sort="ascending"]::after{content:"\25B2"}
th[aria-sort="descending"]::after{content:"\25BC"}
tfoot td{font-weight:700;border-top:2px solid var(--border)}

/* ── Coverage bands ── */
.c-red{color:var(--red)}
.c-orange{color:var(--orange)}
.c-green{color:var(--green)}
.c-blue{color:var(--blue)}
.c-gold{color:var(--gold);font-weight:700}
.c-na{color:var(--muted)}
</style>
"##
    }

    fn template_script() -> &'static str {
        r##"<script>
/* Class on each header is the direction its next click applies: "as" or "desc". */
function compareKeys(kind,a,b){
  if(kind!=='text'){
    /* empty data-key marks an unparseable cell: after every valid key */
    if(a===''||b===''){return (a==='')-(b==='');}
    return parseFloat(a)-parseFloat(b);
  }
  /* by code point, not UTF-16 unit */
  const ca=Array.from(a),cb=Array.from(b);
  for(let i=0;i<ca.length&&i<cb.length;i++){
    const d=ca[i].codePointAt(0)-cb[i].codePointAt(0);
    if(d!==0){return d;}
  }
  return ca.length-cb.length;
}
function sortTable(th){
  const table=th.closest('table');
  const tbody=table.tBodies[0];
  const id=th.id;
  const kind=th.dataset.kind;
  const asc=!th.classList.contains('desc');
  const key=row=>{const td=row.querySelector('td[name="'+id+'"]');return td?td.dataset.key:'';};
  /* Array.prototype.sort is stable: equal keys keep their order */
  const rows=Array.from(tbody.rows);
  rows.sort((r1,r2)=>{const c=compareKeys(kind,key(r1),key(r2));return asc?c:-c;});
  rows.forEach(r=>tbody.appendChild(r));
  table.querySelectorAll('th').forEach(h=>h.removeAttribute('aria-sort'));
  th.setAttribute('aria-sort',asc?'ascending':'descending');
  th.className=asc?'desc':'as';
}
</script>
"##
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}
