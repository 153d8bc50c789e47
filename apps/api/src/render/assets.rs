//! Inline stylesheet and theme script embedded in every exported document.

use super::ExportOptions;

pub const STYLESHEET: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; line-height: 1.6; color: #111827; background: #ffffff; }
header { position: sticky; top: 0; z-index: 40; width: 100%; border-bottom: 1px solid #e5e7eb; background: rgba(255, 255, 255, 0.95); backdrop-filter: blur(8px); }
.container { max-width: 1280px; margin: 0 auto; padding: 0 1.5rem; }
nav { display: flex; height: 5rem; align-items: center; justify-content: space-between; }
nav a { text-decoration: none; color: #374151; font-weight: 500; font-size: 1rem; transition: color 0.2s; }
nav a:hover { color: #2563eb; }
.brand { font-size: 1.5rem; font-weight: 700; }
.nav-links { display: flex; gap: 1.5rem; align-items: center; flex-wrap: wrap; justify-content: flex-end; }
main { padding: 2.5rem 1.5rem; }
section { padding: 4rem 0; scroll-margin-top: 5rem; }
h1 { font-size: 3rem; font-weight: 800; line-height: 1.1; margin-bottom: 1rem; }
h2 { font-size: 2.5rem; font-weight: 800; margin-bottom: 2rem; }
h3 { font-size: 1.5rem; font-weight: 700; }
.accent { color: #2563eb; }
.muted { color: #6b7280; }
.hero-content { display: flex; flex-direction: column; gap: 2.5rem; }
@media (min-width: 768px) { .hero-content { flex-direction: row; align-items: center; } }
.hero-text { flex: 2; }
.hero-title { font-size: 2rem; font-weight: 600; color: #6b7280; margin-bottom: 1rem; }
.hero-summary { font-size: 1.25rem; color: #6b7280; max-width: 48rem; margin-bottom: 2rem; line-height: 1.75; }
.hero-actions { display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 1.5rem; }
.hero-avatar { flex: 1; display: flex; justify-content: center; }
.avatar, .avatar-fallback { width: 12rem; height: 12rem; border-radius: 9999px; border: 4px solid rgba(37, 99, 235, 0.2); }
.avatar { object-fit: cover; }
.avatar-fallback { background: #e5e7eb; display: flex; align-items: center; justify-content: center; font-size: 3rem; font-weight: 700; color: #6b7280; }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.625rem 1rem; border-radius: 0.375rem; font-weight: 500; text-decoration: none; transition: all 0.2s; border: none; cursor: pointer; font-size: 1rem; }
.btn-primary { background: #000; color: #fff; }
.btn-primary:hover { background: rgba(0, 0, 0, 0.9); transform: translateY(-2px); box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }
.btn-outline { border: 1px solid #d1d5db; background: transparent; color: #111827; }
.btn-outline:hover { background: #f9fafb; }
.card { border-radius: 0.5rem; border: 1px solid #e5e7eb; background: #fff; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 1px 2px rgba(0, 0, 0, 0.05); transition: transform 0.2s, box-shadow 0.2s; }
.card:hover { transform: translateY(-2px); box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }
.card-heading { display: flex; flex-direction: column; gap: 0.75rem; margin-bottom: 1rem; }
.card-text { line-height: 1.75; }
.badge { display: inline-flex; padding: 0.25rem 0.625rem; border-radius: 9999px; font-size: 0.75rem; font-weight: 600; border: 1px solid #e5e7eb; background: #f9fafb; color: #111827; }
.badges { display: flex; flex-wrap: wrap; gap: 0.5rem; }
.section-header { display: flex; align-items: center; gap: 1rem; margin-bottom: 2rem; }
.section-divider { flex: 1; height: 1px; background: #e5e7eb; }
.social-links { display: flex; flex-wrap: wrap; gap: 1rem; margin-top: 1.5rem; }
.social-btn { min-width: 2.5rem; height: 2.5rem; padding: 0 0.75rem; border-radius: 9999px; border: 1px solid #d1d5db; display: flex; align-items: center; justify-content: center; text-decoration: none; color: inherit; transition: all 0.2s; }
.social-btn:hover { background: #f9fafb; transform: scale(1.1); }
.contact-row { display: flex; align-items: center; gap: 1rem; margin-bottom: 1rem; }
.contact-label { font-weight: 600; font-size: 1.125rem; }
.contact-row a { color: #2563eb; text-decoration: none; }
.skills-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(150px, 1fr)); gap: 1rem; }
.skill-card { border-radius: 0.5rem; border: 2px solid #e5e7eb; background: #fff; padding: 1rem 1.25rem; text-align: center; font-weight: 600; transition: all 0.3s; }
.skill-card:hover { border-color: #2563eb; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }
.projects-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 1.5rem; }
.custom-element { margin: 1.5rem 0; padding: 1.5rem; border-radius: 0.5rem; border: 1px solid #e5e7eb; background: #fff; }
.wizard-container { display: flex; align-items: center; justify-content: space-between; max-width: 42rem; margin: 0 auto; }
.wizard-step-wrapper { display: flex; align-items: center; flex: 1; }
.wizard-step { display: flex; flex-direction: column; align-items: center; flex: 1; }
.wizard-circle { width: 2.5rem; height: 2.5rem; border-radius: 9999px; display: flex; align-items: center; justify-content: center; border: 2px solid #d1d5db; background: #f9fafb; color: #9ca3af; font-weight: 600; font-size: 0.875rem; }
.wizard-circle.completed { background: #2563eb; border-color: #2563eb; color: #fff; }
.wizard-circle.active { background: #dbeafe; border-color: #2563eb; color: #2563eb; }
.wizard-label { margin-top: 0.5rem; font-size: 0.75rem; font-weight: 500; color: #9ca3af; }
.wizard-label.completed, .wizard-label.active { color: #2563eb; }
.wizard-connector { flex: 1; height: 2px; margin: 0 0.5rem; background: #e5e7eb; }
.wizard-connector.completed { background: #2563eb; }
.steps-container, .progress-list { display: flex; flex-direction: column; gap: 1rem; }
.step-item, .timeline-item { display: flex; align-items: flex-start; gap: 1rem; }
.step-number { flex-shrink: 0; width: 2rem; height: 2rem; border-radius: 9999px; background: #2563eb; color: #fff; display: flex; align-items: center; justify-content: center; font-size: 0.875rem; font-weight: 600; }
.step-content, .timeline-content { flex: 1; padding-top: 0.25rem; font-size: 1rem; font-weight: 500; color: #111827; }
.timeline-wrapper { position: relative; }
.timeline-line { position: absolute; left: 1rem; top: 0; bottom: 0; width: 2px; background: #e5e7eb; }
.timeline-items { display: flex; flex-direction: column; gap: 1.5rem; }
.timeline-item { position: relative; }
.timeline-dot { position: relative; z-index: 10; flex-shrink: 0; width: 2rem; height: 2rem; border-radius: 9999px; background: #2563eb; border: 4px solid #fff; }
.stats-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; text-align: center; }
.stat-item, .progress-item { display: flex; flex-direction: column; }
.stat-value { font-size: 1.875rem; font-weight: 700; color: #2563eb; margin-bottom: 0.25rem; }
.stat-label { font-size: 0.875rem; color: #6b7280; }
.achievements-list { display: flex; flex-direction: column; gap: 0.75rem; }
.achievement-item { display: flex; align-items: center; gap: 0.75rem; }
.achievement-icon { font-size: 1.25rem; color: #2563eb; }
.progress-header { display: flex; justify-content: space-between; margin-bottom: 0.5rem; font-size: 0.875rem; font-weight: 500; }
.progress-percent { color: #6b7280; }
.progress-bar { width: 100%; height: 0.5rem; background: #e5e7eb; border-radius: 9999px; overflow: hidden; }
.progress-fill { height: 100%; background: #2563eb; transition: width 0.5s; }
.theme-toggle { border: 1px solid #d1d5db; background: rgba(0, 0, 0, 0.05); color: #111827; border-radius: 9999px; padding: 0.45rem 0.9rem; font-size: 0.85rem; font-weight: 500; cursor: pointer; transition: all 0.3s ease; }
body.dark { color: #f3f4f6; background: #0a0a0a; }
body.dark header { background: rgba(10, 10, 10, 0.92); border-color: #1f2937; }
body.dark nav a { color: #d1d5db; }
body.dark nav a:hover, body.dark .accent, body.dark .stat-value, body.dark .contact-row a { color: #60a5fa; }
body.dark .theme-toggle { border-color: #374151; background: rgba(255, 255, 255, 0.1); color: #f3f4f6; }
body.dark .card, body.dark .custom-element, body.dark .skill-card { background: #111827; border-color: #1f2937; box-shadow: 0 1px 4px rgba(0, 0, 0, 0.6); }
body.dark .badge, body.dark .social-btn { border-color: #374151; background: #1f2937; color: #f3f4f6; }
body.dark .btn-primary { background: #f3f4f6; color: #0a0a0a; }
body.dark .btn-outline { border-color: #374151; color: #f3f4f6; }
body.dark .avatar-fallback { background: #1f2937; border-color: rgba(96, 165, 250, 0.25); color: #d1d5db; }
body.dark .wizard-circle { border-color: #374151; background: #1f2937; color: #9ca3af; }
body.dark .wizard-circle.completed { background: #60a5fa; border-color: #60a5fa; color: #0f172a; }
body.dark .wizard-circle.active { background: rgba(96, 165, 250, 0.2); border-color: #60a5fa; color: #60a5fa; }
body.dark .wizard-label.completed, body.dark .wizard-label.active { color: #60a5fa; }
body.dark .wizard-connector, body.dark .timeline-line, body.dark .progress-bar, body.dark .section-divider { background: #1f2937; }
body.dark .wizard-connector.completed, body.dark .progress-fill { background: #60a5fa; }
body.dark .timeline-dot { background: #60a5fa; border-color: #0a0a0a; }
body.dark .muted, body.dark .stat-label, body.dark .progress-percent, body.dark .step-content, body.dark .timeline-content { color: #d1d5db; }
@media (max-width: 768px) {
  h1 { font-size: 2.25rem; }
  h2 { font-size: 2rem; }
  nav { flex-wrap: wrap; height: auto; padding: 1rem 0; }
  .brand { width: 100%; margin-bottom: 1rem; }
  .stats-grid { gap: 1rem; }
}
"#;

/// Reads the stored preference once at load and writes it on every toggle.
/// Storage failures (private browsing, disabled storage) leave the default in place.
const THEME_SCRIPT: &str = r#"
(function () {
  var body = document.body;
  var toggle = document.getElementById('themeToggle');
  var key = __STORAGE_KEY__;
  var saved = null;
  try { saved = window.localStorage.getItem(key); } catch (e) {}
  if (saved === 'light') { body.classList.remove('dark'); }
  if (saved === 'dark') { body.classList.add('dark'); }
  function updateToggleLabel() {
    if (!toggle) return;
    toggle.textContent = body.classList.contains('dark') ? 'Light Mode' : 'Dark Mode';
  }
  updateToggleLabel();
  if (toggle) {
    toggle.addEventListener('click', function () {
      body.classList.toggle('dark');
      try { window.localStorage.setItem(key, body.classList.contains('dark') ? 'dark' : 'light'); } catch (e) {}
      updateToggleLabel();
    });
  }
})();
"#;

/// The theme script with the storage key embedded as a JS string literal.
pub fn theme_script(options: &ExportOptions) -> String {
    THEME_SCRIPT.replace("__STORAGE_KEY__", &js_string(&options.storage_key))
}

/// JSON string literal, additionally safe inside a `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}
