//! HTML pages for the admin dashboard.

use chrono::{DateTime, Utc};

use crate::storage::{Message, MessageStats};

/// Banner shown on the list page after a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Delivered,
    DeliveryFailed,
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn layout(title: &str, nav: bool, body: &str) -> String {
    let nav_html = if nav {
        r#"<nav><a href="/admin">Messages</a> · <a href="/stats">Stats</a> · <a href="/logout">Log out</a></nav>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;max-width:960px;margin:24px auto;padding:0 16px;color:#222}}
nav{{margin-bottom:16px}}
table{{border-collapse:collapse;width:100%}}
th,td{{border-bottom:1px solid #ddd;padding:8px;text-align:left;vertical-align:top}}
.error{{color:#b00020}}
.notice{{padding:8px 12px;border-radius:6px;margin-bottom:16px}}
.notice.ok{{background:#e6f4ea}}
.notice.failed{{background:#fdecea}}
.pending{{color:#b06000}}
textarea{{width:100%;min-height:120px}}
</style>
</head>
<body>
{nav_html}
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = html_escape(title),
        nav_html = nav_html,
        body = body,
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let error_html = error
        .map(|msg| format!(r#"<p class="error">{}</p>"#, html_escape(msg)))
        .unwrap_or_default();

    let body = format!(
        r#"{error_html}
<form method="post" action="/login">
<p><label>Username <input type="text" name="username" autofocus></label></p>
<p><label>Password <input type="password" name="password"></label></p>
<p><button type="submit">Log in</button></p>
</form>"#
    );

    layout("Admin login", false, &body)
}

pub fn message_list_page(messages: &[Message], notice: Option<Notice>) -> String {
    let notice_html = match notice {
        Some(Notice::Delivered) => r#"<p class="notice ok">Reply saved and delivered.</p>"#,
        Some(Notice::DeliveryFailed) => {
            r#"<p class="notice failed">Reply saved, but delivery to the user failed.</p>"#
        }
        None => "",
    };

    let rows: String = messages
        .iter()
        .map(|m| {
            let status = if m.replied {
                r#"<span>replied</span>"#
            } else {
                r#"<span class="pending">pending</span>"#
            };
            format!(
                r#"<tr><td><a href="/message/{id}">#{id}</a></td><td>{time}</td><td>{user}</td><td>{text}</td><td>{status}</td></tr>
"#,
                id = m.id,
                time = format_time(&m.timestamp),
                user = html_escape(m.user_name.as_deref().unwrap_or(&m.user_id)),
                text = html_escape(&m.text),
                status = status,
            )
        })
        .collect();

    let table = if messages.is_empty() {
        "<p>No messages yet.</p>".to_string()
    } else {
        format!(
            "<table>\n<tr><th>ID</th><th>Received</th><th>From</th><th>Text</th><th>Status</th></tr>\n{}</table>",
            rows
        )
    };

    layout("Messages", true, &format!("{}\n{}", notice_html, table))
}

pub fn message_detail_page(message: &Message) -> String {
    let reply_html = match (&message.reply_text, &message.replied_at) {
        (Some(reply), Some(at)) if message.replied => format!(
            "<h2>Reply</h2>\n<p>{}</p>\n<p><small>Sent {}</small></p>",
            html_escape(reply),
            format_time(at)
        ),
        _ => String::new(),
    };

    let body = format!(
        r#"<p><strong>From:</strong> {user} <small>(id {user_id})</small></p>
<p><strong>Received:</strong> {time}</p>
<blockquote>{text}</blockquote>
{reply_html}
<form method="post" action="/message/{id}">
<p><textarea name="reply" required></textarea></p>
<p><button type="submit">Send reply</button></p>
</form>"#,
        user = html_escape(message.user_name.as_deref().unwrap_or("unknown")),
        user_id = html_escape(&message.user_id),
        time = format_time(&message.timestamp),
        text = html_escape(&message.text),
        reply_html = reply_html,
        id = message.id,
    );

    layout(&format!("Message #{}", message.id), true, &body)
}

pub fn stats_page(stats: &MessageStats) -> String {
    let body = format!(
        r#"<table>
<tr><th>Total messages</th><td>{}</td></tr>
<tr><th>Replied</th><td>{}</td></tr>
<tr><th>Pending</th><td>{}</td></tr>
</table>"#,
        stats.total, stats.replied, stats.pending
    );

    layout("Stats", true, &body)
}
