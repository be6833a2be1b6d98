use std::fmt::Write;

use axum::http::StatusCode;
use common::{Light, Room};
use hue_scenes::{
    error::SceneError,
    scene::prelude::{RoomOverview, SceneDetail},
};

/// Escapes text for use in HTML bodies and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn page(title: &str, back: Option<&str>, body: &str) -> String {
    let back = back
        .map(|href| format!(r#"<a class="back" href="{}">&larr; Back</a>"#, escape(href)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{back}
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
        back = back,
        body = body,
    )
}

pub fn home(rooms: &[Room]) -> String {
    let mut body = String::from("<ul class=\"rooms\">\n");
    for room in rooms {
        let _ = writeln!(
            body,
            r#"<li><a href="/rooms/{}">{}</a></li>"#,
            escape(&room.id),
            escape(&room.name)
        );
    }
    body.push_str("</ul>\n");

    page("Rooms", None, &body)
}

pub fn room(overview: &RoomOverview) -> String {
    let room_id = escape(&overview.room.id);
    let mut body = String::new();

    if overview.loop_active {
        let _ = writeln!(
            body,
            r#"<p class="status">A scene is looping. <a href="/rooms/{}/stop">Stop</a></p>"#,
            room_id
        );
    }

    body.push_str("<ul class=\"scenes\">\n");
    for scene in &overview.scenes {
        let marker = if overview.looping == Some(scene.id) {
            " <span class=\"looping\">looping</span>"
        } else {
            ""
        };
        let _ = writeln!(
            body,
            r#"<li><a href="/rooms/{}/scenes/{}">{}</a>{}</li>"#,
            room_id,
            scene.id,
            escape(&scene.name),
            marker
        );
    }
    body.push_str("</ul>\n");

    let _ = writeln!(
        body,
        r#"<p><a class="button" href="/rooms/{}/createscene">New scene</a></p>"#,
        room_id
    );

    page(&overview.room.name, Some("/"), &body)
}

pub fn create_scene(room_id: &str, lights: &[Light]) -> String {
    let mut body = String::new();

    let _ = writeln!(
        body,
        r#"<form method="post" action="/rooms/{}/createscene">
<label>Name <input name="name" required></label>
<fieldset class="colours">
<legend>Colours</legend>"#,
        escape(room_id)
    );

    // One picker per light is a sensible starting palette
    let count = lights.len().max(1);
    for i in 1..=count {
        let _ = writeln!(
            body,
            r##"<input type="color" name="hexColour-{}" value="#ffffff">"##,
            i
        );
    }

    body.push_str("</fieldset>\n<button type=\"submit\">Create</button>\n</form>\n");

    page("New scene", Some(&format!("/rooms/{}", room_id)), &body)
}

pub fn scene(room_id: &str, detail: &SceneDetail, status: Option<&str>) -> String {
    let room_id_escaped = escape(room_id);
    let scene_id = detail.scene.id;
    let mut body = String::new();

    if let Some(status) = status {
        let _ = writeln!(body, r#"<p class="status">{}</p>"#, escape(status));
    } else if detail.looping {
        body.push_str("<p class=\"status\">This scene is looping.</p>\n");
    }

    body.push_str("<ol class=\"swatches\">\n");
    for colour in &detail.colours {
        let _ = writeln!(
            body,
            r#"<li style="background: {hex}" title="{hex}"></li>"#,
            hex = escape(&colour.hex)
        );
    }
    body.push_str("</ol>\n");

    let _ = writeln!(
        body,
        r#"<form method="post" action="/rooms/{}/scenes/{}">"#,
        room_id_escaped, scene_id
    );

    let colour_count = detail.colours.len().max(1);
    for (i, light) in detail.lights.iter().enumerate() {
        let position = detail
            .positions
            .get(&light.id)
            .copied()
            .unwrap_or(i % colour_count + 1);
        let _ = writeln!(
            body,
            r#"<label>{} <input type="number" name="light-{}" min="1" max="{}" value="{}"></label>"#,
            escape(&light.name),
            escape(&light.id),
            colour_count,
            position
        );
    }

    body.push_str(
        r#"<label><input type="checkbox" name="loop" value="true"> Loop</label>
<label>Transition time (s) <input type="number" name="transitionTime" min="1" value="5"></label>
<button type="submit">Activate</button>
</form>
"#,
    );

    let _ = writeln!(
        body,
        r#"<p><a class="danger" href="/rooms/{}/scenes/{}/delete">Delete scene</a></p>"#,
        room_id_escaped, scene_id
    );

    page(
        &detail.scene.name,
        Some(&format!("/rooms/{}", room_id)),
        &body,
    )
}

pub fn error_page(status: StatusCode, err: &SceneError) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    page(
        title,
        Some("/"),
        &format!("<p class=\"error\">{}</p>\n", escape(&err.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_home_lists_rooms() {
        let html = home(&[Room {
            id: "1".to_string(),
            name: "Lounge <main>".to_string(),
            lights: vec![],
        }]);

        assert!(html.contains(r#"<a href="/rooms/1">Lounge &lt;main&gt;</a>"#));
    }
}
