//! Style sheets injected by the app and its modules.

pub const APP_STYLES_ID: &str = "userscript-styles";
pub const MOBILE_STYLES_ID: &str = "userscript-mobile-styles";
pub const EXAMPLE_STYLES_ID: &str = "example-module-styles";

pub const BASE_CSS: &str = r#"
.userscript-highlight {
  background-color: yellow !important;
  border: 2px solid red !important;
}
"#;

/// Appended to [`BASE_CSS`] on handheld devices.
pub const MOBILE_HIGHLIGHT_CSS: &str = r#"
.userscript-highlight {
  padding: 8px !important;
  border-radius: 4px !important;
  font-size: 16px !important;
}
"#;

pub const MOBILE_CSS: &str = r#"
.userscript-mobile-container {
  touch-action: manipulation;
  -webkit-user-select: none;
  user-select: none;
}
.userscript-mobile-button {
  min-height: 44px;
  min-width: 44px;
  padding: 12px 16px;
  font-size: 16px;
  border-radius: 8px;
  touch-action: manipulation;
}
.userscript-mobile-menu {
  position: fixed;
  background: rgba(255, 255, 255, 0.95);
  border-radius: 12px;
  z-index: 10000;
  max-width: 90vw;
  max-height: 80vh;
  overflow-y: auto;
}
.userscript-mobile-backdrop {
  position: fixed;
  inset: 0;
  background: rgba(0, 0, 0, 0.3);
  z-index: 9999;
}
@media (prefers-color-scheme: dark) {
  .userscript-mobile-menu { background: rgba(40, 40, 40, 0.95); color: white; }
}
"#;

pub const EXAMPLE_CSS: &str = r#"
.example-module-button {
  position: fixed;
  top: 20px;
  right: 20px;
  z-index: 9999;
  padding: 10px 15px;
  background: #007cba;
  color: white;
  border: none;
  border-radius: 5px;
  cursor: pointer;
}
.example-module-notification {
  position: fixed;
  top: 70px;
  right: 20px;
  z-index: 9998;
  padding: 10px;
  background: #28a745;
  color: white;
  border-radius: 5px;
  opacity: 0;
  transition: opacity 0.3s;
}
.example-module-notification.show {
  opacity: 1;
}
"#;
