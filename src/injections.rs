const BROWSER_CSS: &str = include_str!("../assets/browser.css");
const STYLE_ELEMENT_ID: &str = "dualboard-style";

/// Script that adds `css` to the page once, however often it is evaluated.
pub(crate) fn stylesheet_script(css: &str, overlay_titlebar: bool) -> String {
    // JSON string literals are valid JavaScript string literals.
    let css_literal = serde_json::to_string(css).unwrap_or_else(|_| "\"\"".to_string());
    let titlebar_class = if overlay_titlebar {
        "document.documentElement.classList.add('dualboard-overlay-titlebar');"
    } else {
        ""
    };
    format!(
        "(function () {{\
           {titlebar_class}\
           if (document.getElementById('{STYLE_ELEMENT_ID}')) return;\
           var style = document.createElement('style');\
           style.id = '{STYLE_ELEMENT_ID}';\
           style.textContent = {css_literal};\
           (document.head || document.documentElement).appendChild(style);\
         }})();"
    )
}

pub(crate) fn inject_stylesheet<R: tauri::Runtime>(
    window: &tauri::WebviewWindow<R>,
) -> Result<(), tauri::Error> {
    let script = stylesheet_script(BROWSER_CSS, cfg!(target_os = "macos"));
    window.eval(&script)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_script_escapes_css() {
        let script = stylesheet_script("a::after { content: \"</style>\\n\"; }", false);
        assert!(script.contains(r#"style.textContent = "a::after { content: \"</style>\\n\"; }";"#));
        assert!(!script.contains("dualboard-overlay-titlebar"));
    }

    #[test]
    fn test_stylesheet_script_is_guarded() {
        let script = stylesheet_script(BROWSER_CSS, true);
        assert!(script.contains("document.getElementById('dualboard-style')"));
        assert!(script.contains("classList.add('dualboard-overlay-titlebar')"));
    }
}
