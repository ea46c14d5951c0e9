// src/status/page.rs
//
// The status page is rendered once at startup. It does not change per
// request; the browser polls `/status/health` and redraws the cards.

use super::model::{ServiceCheckResult, ServiceDescriptor};
use std::time::Duration;

pub const HEALTH_PATH: &str = "/status/health";
pub const FETCH_FAILED_DETAIL: &str = "Cannot reach /status/health";

pub fn render_status_page(services: &[ServiceDescriptor], poll_interval: Duration) -> String {
    let defaults: Vec<ServiceCheckResult> = services
        .iter()
        .map(|s| ServiceCheckResult::checking(s.name.as_str(), s.port))
        .collect();
    // serde_json output is valid JS; `</` is escaped so a name can never
    // close the script element.
    let defaults_json = serde_json::to_string(&defaults)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");

    let interval_ms = poll_interval.as_millis();
    let interval_label = if interval_ms % 1000 == 0 {
        format!("{}s", interval_ms / 1000)
    } else {
        format!("{}ms", interval_ms)
    };

    TEMPLATE
        .replace("__DEFAULT_SERVICES__", &defaults_json)
        .replace("__POLL_INTERVAL_MS__", &interval_ms.to_string())
        .replace("__POLL_INTERVAL_LABEL__", &interval_label)
        .replace("__HEALTH_PATH__", HEALTH_PATH)
        .replace("__FETCH_FAILED_DETAIL__", FETCH_FAILED_DETAIL)
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>System Status</title>
<style>
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { background: #0f172a; color: #e2e8f0; font-family: 'Segoe UI', system-ui, sans-serif; padding: 48px 24px; }
  .wrap { max-width: 680px; margin: 0 auto; }
  .header { text-align: center; margin-bottom: 48px; }
  .header h1 { font-size: 44px; font-weight: 800; color: #fff; letter-spacing: -1px; }
  .header p { font-size: 14px; color: #94a3b8; margin-top: 8px; }
  .section-label { font-size: 11px; font-weight: 600; color: #64748b; text-transform: uppercase; letter-spacing: 1px; margin-bottom: 12px; }
  .services { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; margin-bottom: 40px; }
  .card { background: #1e293b; border-radius: 10px; padding: 16px 20px; border: 1px solid #334155; transition: border-color 0.3s; }
  .card.up { border-color: #22c55e33; }
  .card.down { border-color: #ef444433; }
  .card.checking { border-color: #f59e0b33; }
  .card-top { display: flex; justify-content: space-between; align-items: center; }
  .card-name { font-size: 14px; font-weight: 600; }
  .card-status { display: flex; align-items: center; gap: 6px; }
  .dot { width: 8px; height: 8px; border-radius: 50%; }
  .dot.up { background: #22c55e; box-shadow: 0 0 8px #22c55e88; animation: pulse 2s infinite; }
  .dot.down { background: #ef4444; box-shadow: 0 0 8px #ef444488; }
  .dot.checking { background: #f59e0b; box-shadow: 0 0 8px #f59e0b88; animation: pulse 1s infinite; }
  .status-text { font-size: 11px; font-weight: 600; }
  .status-text.up { color: #22c55e; }
  .status-text.down { color: #ef4444; }
  .status-text.checking { color: #f59e0b; }
  .card-detail { font-size: 11px; color: #64748b; margin-top: 8px; font-family: 'Cascadia Code', 'Fira Code', monospace; word-break: break-all; }
  .refresh-bar { text-align: center; margin-bottom: 32px; font-size: 12px; color: #475569; }
  .refresh-bar span { color: #94a3b8; }
  .overall { text-align: center; margin-bottom: 16px; font-size: 13px; font-weight: 600; }
  .overall.healthy { color: #22c55e; }
  .overall.degraded { color: #ef4444; }
  @keyframes pulse { 0%,100% { opacity: 1; } 50% { opacity: 0.4; } }
</style>
</head>
<body>
<div class="wrap">
  <div class="header">
    <h1>System Status</h1>
    <p>SoW review and automation API</p>
  </div>

  <div class="overall" id="overall"></div>
  <div class="refresh-bar">Auto-refreshing every __POLL_INTERVAL_LABEL__ &middot; Last check: <span id="last-check">...</span></div>

  <div class="section-label">Services</div>
  <div class="services" id="services"></div>
</div>

<script>
const HEALTH_URL = "__HEALTH_PATH__";
const POLL_INTERVAL_MS = __POLL_INTERVAL_MS__;
const defaultServices = __DEFAULT_SERVICES__;

function esc(value) {
  return String(value).replace(/[&<>"']/g, c => ({ "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;" }[c]));
}

function renderServices(services) {
  document.getElementById("services").innerHTML = services.map(s => {
    const st = s.status;
    const label = st === "up" ? "Running" : st === "checking" ? "Checking..." : "Offline";
    const detail = st === "up" ? "localhost:" + s.port + " - " + s.detail : (s.detail || (st === "checking" ? "" : "Service unreachable"));
    return `<div class="card ${esc(st)}">
      <div class="card-top">
        <div class="card-name">${esc(s.name)}</div>
        <div class="card-status">
          <div class="dot ${esc(st)}"></div>
          <span class="status-text ${esc(st)}">${label}</span>
        </div>
      </div>
      <div class="card-detail">${esc(detail)}</div>
    </div>`;
  }).join("");
}

function renderOverall(status) {
  const el = document.getElementById("overall");
  el.className = "overall " + (status || "");
  el.textContent = status === "healthy" ? "All systems operational" : status === "degraded" ? "Degraded" : "";
}

renderServices(defaultServices);

async function refresh() {
  try {
    const r = await fetch(HEALTH_URL, { cache: "no-store" });
    if (!r.ok) throw new Error("HTTP " + r.status);
    const data = await r.json();
    if (!Array.isArray(data.services)) throw new Error("malformed health document");
    renderServices(data.services);
    renderOverall(data.status);
    document.getElementById("last-check").textContent = new Date().toLocaleTimeString() + ` (${data.check_ms}ms)`;
  } catch (e) {
    renderServices(defaultServices.map(s => ({ ...s, status: "down", detail: "__FETCH_FAILED_DETAIL__" })));
    renderOverall("degraded");
    document.getElementById("last-check").textContent = "Failed - " + new Date().toLocaleTimeString();
  }
}

refresh();
setInterval(refresh, POLL_INTERVAL_MS);
</script>
</body>
</html>
"#;
