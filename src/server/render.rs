//! Server-side HTML for the prediction page

use crate::form::{FormSchema, NumericField, Widget};
use crate::models::artifact::FeatureImportance;
use crate::types::{AdImpression, ClickPrediction, Insight};
use std::fmt::Write;

/// What to show under the form.
pub enum Outcome<'a> {
    /// Nothing submitted yet
    Empty,
    Prediction {
        prediction: &'a ClickPrediction,
        importance: &'a [FeatureImportance],
    },
    Error(String),
}

const STYLE: &str = r#"
body{font-family:system-ui,-apple-system,sans-serif;max-width:960px;margin:0 auto;padding:24px;background:#0e1117;color:#fafafa}
h1{margin-bottom:4px}h3{margin:16px 0 8px}
.subtitle{color:#a3a8b4;margin-top:0}
.grid{display:grid;grid-template-columns:1fr 1fr;gap:24px}
.grid3{display:grid;grid-template-columns:1fr 1fr 1fr;gap:16px;align-items:center}
label{display:block;font-size:14px;margin:10px 0 4px}
input[type=number],select{width:100%;padding:8px;border-radius:6px;border:1px solid #3b3f4a;background:#262730;color:#fafafa}
input[type=range]{width:80%}
output{margin-left:8px;font-weight:600}
button{margin-top:20px;padding:10px 20px;border:0;border-radius:6px;background:#ff4b4b;color:#fff;font-size:15px;cursor:pointer}
.banner{padding:12px 16px;border-radius:6px;margin:10px 0}
.success{background:#173928;color:#3dd56d}
.warning{background:#3e3a16;color:#ffd16a}
.error{background:#3e1c1c;color:#ff6c6c}
.info{background:#172d43;color:#60b4ff}
.metric .label{font-size:14px;color:#a3a8b4}.metric .value{font-size:32px}
table{border-collapse:collapse;width:100%}td,th{padding:6px 10px;border-bottom:1px solid #3b3f4a;text-align:left}
details{margin-top:16px}summary{cursor:pointer}
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the full page: form pre-filled with `values`, then the outcome.
pub fn page(form: &FormSchema, values: &AdImpression, outcome: &Outcome) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("<title>Ad Click-Through Rate (CTR) Prediction</title>\n");
    let _ = write!(html, "<style>{}</style>\n</head>\n<body>\n", STYLE);

    html.push_str(
        "<div class=\"banner success\" id=\"model-status\">Model loaded successfully!</div>\n",
    );
    html.push_str("<h1>🎯 Ad Click-Through Rate (CTR) Prediction</h1>\n");
    html.push_str(
        "<p class=\"subtitle\">Predict whether a user will click on an advertisement</p>\n",
    );

    render_form(&mut html, form, values);

    match outcome {
        Outcome::Empty => {}
        Outcome::Prediction {
            prediction,
            importance,
        } => render_prediction(&mut html, prediction, importance),
        Outcome::Error(message) => render_error(&mut html, message),
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, form: &FormSchema, values: &AdImpression) {
    html.push_str("<form id=\"prediction-form\" method=\"post\" action=\"/predict\">\n");
    html.push_str("<div class=\"grid\">\n<div>\n<h3>User Demographics</h3>\n");
    number_input(html, &form.demographics[0], values.age as f64);
    select(html, "gender", "Gender", &form.genders, &values.gender);
    number_input(html, &form.demographics[1], values.area_income);
    html.push_str("</div>\n<div>\n<h3>User Behavior</h3>\n");
    number_input(html, &form.behavior[0], values.daily_time_spent);
    number_input(html, &form.behavior[1], values.daily_internet_usage);
    html.push_str("</div>\n</div>\n");

    html.push_str("<h3>Location &amp; Content</h3>\n<div class=\"grid\">\n<div>\n");
    select(html, "city", "City", &form.cities.values, &values.city);
    select(html, "country", "Country", &form.countries.values, &values.country);
    html.push_str("</div>\n<div>\n");
    select(html, "ad_topic", "Ad Topic", &form.ad_topics.values, &values.ad_topic);

    let time_values = [
        values.hour_of_day,
        values.day_of_month,
        values.day_of_week,
        values.month,
    ];
    for (field, value) in form.time_context.iter().zip(time_values) {
        number_input(html, field, value as f64);
    }
    html.push_str("</div>\n</div>\n");
    html.push_str("<button type=\"submit\">Predict CTR</button>\n</form>\n");
}

fn number_input(html: &mut String, field: &NumericField, value: f64) {
    let _ = writeln!(
        html,
        "<label for=\"{name}\">{label}</label>",
        name = field.name,
        label = escape(field.label)
    );
    let step = field
        .step
        .map_or_else(|| "any".to_string(), |step| step.to_string());
    match field.widget {
        Widget::Number => {
            let _ = writeln!(
                html,
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" required>",
                name = field.name,
                min = field.min,
                max = field.max,
                step = step,
                value = value,
            );
        }
        Widget::Slider => {
            let _ = writeln!(
                html,
                "<input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" oninput=\"this.nextElementSibling.value=this.value\"><output>{value}</output>",
                name = field.name,
                min = field.min,
                max = field.max,
                step = step,
                value = value,
            );
        }
    }
}

fn select(html: &mut String, name: &str, label: &str, options: &[String], current: &str) {
    let _ = writeln!(
        html,
        "<label for=\"{name}\">{label}</label>",
        name = name,
        label = label
    );
    let _ = writeln!(html, "<select id=\"{name}\" name=\"{name}\">", name = name);
    // Keep a submitted value the vocabulary does not know
    if !current.is_empty() && !options.iter().any(|option| option == current) {
        let _ = writeln!(
            html,
            "<option value=\"{escaped}\" selected>{escaped}</option>",
            escaped = escape(current)
        );
    }
    for option in options {
        let selected = if option == current { " selected" } else { "" };
        let escaped = escape(option);
        let _ = writeln!(
            html,
            "<option value=\"{escaped}\"{selected}>{escaped}</option>",
            escaped = escaped,
            selected = selected
        );
    }
    html.push_str("</select>\n");
}

fn render_prediction(
    html: &mut String,
    prediction: &ClickPrediction,
    importance: &[FeatureImportance],
) {
    html.push_str("<section id=\"result\">\n");
    html.push_str("<div class=\"banner success\">Prediction completed!</div>\n");

    html.push_str("<div class=\"grid3\">\n");
    if prediction.will_click {
        html.push_str(
            "<div class=\"banner success\" id=\"verdict\">🎯 <strong>WILL CLICK</strong></div>\n",
        );
    } else {
        html.push_str(
            "<div class=\"banner warning\" id=\"verdict\">❌ <strong>WON'T CLICK</strong></div>\n",
        );
    }
    let _ = writeln!(
        html,
        "<div class=\"metric\"><div class=\"label\">Click Probability</div><div class=\"value\" id=\"probability\">{}</div></div>",
        prediction.probability_percent()
    );
    html.push_str("<div></div>\n</div>\n");

    html.push_str("<h3>📊 Insights</h3>\n");
    let (class, icon) = match prediction.insight {
        Insight::Excellent => ("success", "🎯"),
        Insight::Moderate => ("warning", "⚠️"),
        Insight::Poor => ("error", "❌"),
    };
    let _ = writeln!(
        html,
        "<div class=\"banner {class}\" id=\"insight\">{icon} <strong>{headline}</strong> {message}</div>",
        class = class,
        icon = icon,
        headline = prediction.insight.headline(),
        message = prediction.insight.message()
    );

    if !prediction.unseen_categories.is_empty() {
        let _ = writeln!(
            html,
            "<div class=\"banner info\" id=\"unseen\">Not seen during training, encoded with defaults: {}</div>",
            escape(&prediction.unseen_categories.join(", "))
        );
    }

    html.push_str("<details id=\"feature-importance\">\n<summary>Feature Importance</summary>\n");
    if !importance.is_empty() {
        html.push_str("<table>\n<tr><th>Feature</th><th>Importance</th></tr>\n");
        for row in importance {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{:.4}</td></tr>",
                escape(&row.feature),
                row.importance
            );
        }
        html.push_str("</table>\n");
    }
    html.push_str("</details>\n</section>\n");
}

fn render_error(html: &mut String, message: &str) {
    html.push_str("<section id=\"result\">\n");
    let _ = writeln!(
        html,
        "<div class=\"banner error\" id=\"error\">Error making prediction: {}</div>",
        escape(message)
    );
    html.push_str(
        "<div class=\"banner info\">Please check your input values and try again.</div>\n",
    );
    html.push_str("</section>\n");
}
