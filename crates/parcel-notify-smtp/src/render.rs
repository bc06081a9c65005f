//! Message rendering
//!
//! Pure functions from an event history to the HTML and plain-text bodies of
//! a notification. The first event is highlighted as the latest update and
//! stamped with the send time; the rest are listed underneath in order.

use chrono::DateTime;
use chrono_tz::Tz;
use parcel_core::traits::TrackingEvent;
use std::fmt::Write;

/// Logo shown at the top of the HTML message
pub const LOGO_URL: &str =
    "https://www.dhl.com/content/dam/dhl/global/core/images/logos/dhl-logo.svg";

const DATE_FORMAT: &str = "%B - %d - %Y";
const TIME_FORMAT: &str = "%I:%M %p";

const STYLE: &str = r#"
    body { background-color: #ffffff; font-family: Arial, sans-serif; color: #333333; }
    .container { margin: 0 auto; max-width: 600px; padding: 20px; }
    .logo { text-align: center; }
    .logo img { max-width: 150px; }
    .content { background-color: #ffffff; padding: 20px; margin-top: 20px; }
    .update-title { font-weight: bold; font-size: 18px; color: #333333; margin-bottom: 10px; }
    .update-time { color: #666666; margin-bottom: 20px; }
    .update-location { font-weight: bold; margin-bottom: 5px; }
    .update-description { margin-bottom: 10px; }
    .latest-update { background-color: #f1f1f1; padding: 10px; border-radius: 5px; text-align: left; }
"#;

/// Render the HTML body of a notification
pub fn render_html(tracking_number: &str, events: &[TrackingEvent], sent_at: &DateTime<Tz>) -> String {
    let mut html = String::with_capacity(2048);

    // write! into a String cannot fail
    let _ = write!(
        html,
        "<html>\n<head>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n\
         <div class=\"logo\"><img src=\"{LOGO_URL}\" alt=\"DHL Logo\"></div>\n\
         <div class=\"content\">\n\
         <div class=\"update-title\">Tracking Number: {}</div>\n",
        escape(tracking_number)
    );

    if let Some((latest, earlier)) = events.split_first() {
        let _ = write!(
            html,
            "<div class=\"update-time latest-update\">\n\
             <div><strong>NOW</strong></div>\n\
             <div>{}</div>\n<div>{}</div>\n\
             <div class=\"update-location\">{}</div>\n\
             <div class=\"update-description\">{}</div>\n\
             </div>\n",
            sent_at.format(DATE_FORMAT),
            sent_at.format(TIME_FORMAT),
            escape(&latest.location),
            escape(&latest.description)
        );

        for event in earlier {
            let _ = write!(
                html,
                "<div class=\"update-location\">{}</div>\n\
                 <div class=\"update-description\">{}</div>\n\
                 <br>\n",
                escape(&event.location),
                escape(&event.description)
            );
        }
    }

    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Render the plain-text alternative of a notification
pub fn render_text(tracking_number: &str, events: &[TrackingEvent], sent_at: &DateTime<Tz>) -> String {
    let mut text = format!("Tracking Number: {}\n", tracking_number);

    if let Some((latest, earlier)) = events.split_first() {
        let _ = write!(
            text,
            "\nNOW ({} {})\n{}\n{}\n",
            sent_at.format(DATE_FORMAT),
            sent_at.format(TIME_FORMAT),
            latest.location,
            latest.description
        );

        for event in earlier {
            let _ = write!(text, "\n{}\n{}\n", event.location, event.description);
        }
    }

    text
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
