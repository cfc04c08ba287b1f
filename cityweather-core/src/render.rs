//! Turning an [`Observation`] into something a person can read.
//!
//! [`render_html`] produces the fragment that goes into the result container of
//! the page, using Bootstrap utility classes. [`render_text`] is the terminal
//! counterpart and carries the same values.

use std::fmt::{self, Write};

use html_builder::{Buffer, Html5, Node};

use crate::model::Observation;

const ICON_STYLE: &str = r#"style="width: 80px; height: 80px; margin: -0.5rem;""#;

/// Round half towards positive infinity, so 20.5 becomes 21 and -2.5 becomes -2.
pub fn round_temperature(celsius: f64) -> i64 {
    (celsius + 0.5).floor() as i64
}

/// Convert m/s to km/h with one decimal place.
pub fn wind_kmh(mps: f64) -> String {
    format!("{:.1}", mps * 3.6)
}

/// Upper-case the first letter of every space-separated word.
pub fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

fn heading(observation: &Observation) -> String {
    match &observation.country {
        Some(country) => format!("{}, {}", observation.location_name, country),
        None => observation.location_name.clone(),
    }
}

pub fn render_html(observation: &Observation) -> Result<String, fmt::Error> {
    let description = capitalize_words(&observation.description);
    let temperature = round_temperature(observation.temperature_c);
    let feels_like = round_temperature(observation.feels_like_c);

    let mut buf = Buffer::new();

    write!(
        buf.h2().attr(r#"class="fs-3 fw-semibold mb-2""#),
        "{}",
        escape(&heading(observation))
    )?;

    {
        let mut row = buf
            .div()
            .attr(r#"class="d-flex align-items-center justify-content-center""#);
        row.img()
            .attr(&format!(r#"src="{}""#, escape(&icon_url(&observation.icon))))
            .attr(&format!(r#"alt="{}""#, escape(&description)))
            .attr(ICON_STYLE);
        write!(row.span().attr(r#"class="display-3 fw-bold""#), "{temperature}°C")?;
    }

    write!(
        buf.p().attr(r#"class="fs-5 text-capitalize text-body-secondary mt-2""#),
        "{}",
        escape(&description)
    )?;
    write!(
        buf.p().attr(r#"class="fs-6 text-muted""#),
        "Feels like {feels_like}°C"
    )?;

    {
        let mut grid = buf.div().attr(r#"class="row g-3 mt-4 text-center""#);
        stat_cell(&mut grid, "Humidity", &format!("{}%", observation.humidity_pct))?;
        stat_cell(
            &mut grid,
            "Wind Speed",
            &format!("{} km/h", wind_kmh(observation.wind_speed_mps)),
        )?;
    }

    Ok(buf.finish())
}

fn stat_cell(grid: &mut Node<'_>, label: &str, value: &str) -> fmt::Result {
    let mut col = grid.div().attr(r#"class="col""#);
    let mut cell = col.div().attr(r#"class="bg-light-subtle p-3 rounded-3""#);
    write!(cell.p().attr(r#"class="fs-sm text-muted fw-medium mb-1""#), "{label}")?;
    write!(cell.p().attr(r#"class="fs-4 fw-semibold mb-0""#), "{}", escape(value))
}

pub fn render_text(observation: &Observation) -> String {
    format!(
        "{heading}\n\
         {temperature}°C  {description} (feels like {feels_like}°C)\n\
         Humidity {humidity}%  |  Wind {wind} km/h\n\
         Observed {observed}",
        heading = heading(observation),
        temperature = round_temperature(observation.temperature_c),
        description = capitalize_words(&observation.description),
        feels_like = round_temperature(observation.feels_like_c),
        humidity = observation.humidity_pct,
        wind = wind_kmh(observation.wind_speed_mps),
        observed = observation.observed_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

fn escape(s: &str) -> String {
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
