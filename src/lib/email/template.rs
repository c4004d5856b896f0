/// HTML body sent to each recipient: the campaign's template text, the
/// training link pointing at the click tracker, and a 1x1 pixel pointing at
/// the open tracker.
pub fn render_email_body(template: &str, click_url: &str, open_url: &str) -> String {
    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif;">

    <h2>Security Awareness Training</h2>

    <p>{template}</p>

    <p>
        <a href="{click_url}"
           style="
               background:#0078d4;
               color:white;
               padding:12px 20px;
               text-decoration:none;
               border-radius:6px;
               font-weight:bold;
           ">
           Start Training
        </a>
    </p>

    <img src="{open_url}" width="1" height="1"/>

</body>
</html>"#
    )
}
