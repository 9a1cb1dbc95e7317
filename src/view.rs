use std::{fmt::Write as _, io, str::FromStr};

use crate::{
    catalog::CatalogStats,
    config::Config,
    error::Error,
    recommend::Recommendation,
    resource::Resources,
};

/// Page the terminal front-end is showing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Home,
    /// `None` until the user has entered a query
    Jobs { query: Option<String> },
    Analytics,
    Contact,
}

/// One line of input in a browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(ViewState),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown command `{0}` (try `help`)")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "" | "home" => Command::Show(ViewState::Home),
            "jobs" | "search" => Command::Show(ViewState::Jobs {
                query: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "analytics" => Command::Show(ViewState::Analytics),
            "contact" => Command::Show(ViewState::Contact),
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(UnknownCommand(word.to_string())),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
commands:
  home              catalog statistics
  jobs <query>      recommend postings for a query
  analytics         top categories
  contact           contact details
  reload            re-read changed data and model files
  quit              leave
";

/// Render a page. Resources are loaded on demand; a load failure is shown
/// in place of the page and the session keeps going.
pub fn render<W: io::Write>(
    state: &ViewState,
    resources: &mut Resources,
    config: &Config,
    out: &mut W,
) -> io::Result<()> {
    match state {
        ViewState::Home => match resources.catalog() {
            Ok(catalog) => out.write_all(render_stats(&catalog.stats()).as_bytes()),
            Err(err) => render_failure(out, &err),
        },
        ViewState::Jobs { query: None } => {
            writeln!(out, "Discover your perfect match: enter `jobs <query>`, e.g. `jobs senior data scientist`")
        }
        ViewState::Jobs { query: Some(query) } => {
            let recommender = match resources.recommender() {
                Ok(recommender) => recommender,
                Err(err) => return render_failure(out, &err),
            };
            match recommender.recommend(query, config.search.top_k) {
                Ok(results) => out.write_all(render_recommendations(&results).as_bytes()),
                Err(Error::EmptyQuery) => writeln!(out, "Enter a non-empty query."),
                Err(err) => render_failure(out, &err),
            }
        }
        ViewState::Analytics => match resources.catalog() {
            Ok(catalog) => {
                let counts = catalog.category_counts(config.analytics.top_categories);
                writeln!(out, "Top job categories")?;
                out.write_all(bar_chart(&counts, config.analytics.bar_width).as_bytes())
            }
            Err(err) => render_failure(out, &err),
        },
        ViewState::Contact => {
            writeln!(out, "Contact information")?;
            writeln!(out, "  Email:   {}", config.contact.email)?;
            writeln!(out, "  Address: {}", config.contact.address)
        }
    }
}

fn render_failure<W: io::Write>(out: &mut W, err: &Error) -> io::Result<()> {
    writeln!(out, "Failed to load system components: {err}")
}

pub fn render_stats(stats: &CatalogStats) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "{:>12}  Total Jobs", thousands(stats.total_jobs));
    let _ = writeln!(page, "{:>12}  Categories", stats.categories);
    let _ = writeln!(page, "{:>12}  Countries", stats.countries);
    let _ = writeln!(page, "{:>12}  Avg Rate/hr", format!("${:.0}", stats.mean_hourly_rate));
    page
}

pub fn render_recommendations(results: &[Recommendation]) -> String {
    if results.is_empty() {
        return "No postings to match against.\n".to_string();
    }
    let mut page = String::from("Your personalized job matches\n");
    for result in results {
        let rate = result
            .hourly_rate
            .map_or_else(|| "n/a".to_string(), |rate| format!("${rate}/hour"));
        let _ = writeln!(page, "\n#{} {}", result.rank, result.title);
        let _ = writeln!(page, "   {} | {} | {}", result.category, result.country, rate);
        let _ = writeln!(page, "   {}", result.link);
        let _ = writeln!(page, "   {:.1}% Match", result.percent);
    }
    page
}

/// Horizontal bars scaled so the largest count spans `width` characters.
/// Any non-zero count gets at least one block.
pub fn bar_chart(counts: &[(String, usize)], width: usize) -> String {
    let Some(max) = counts.iter().map(|(_, count)| *count).max() else {
        return "(no categories)\n".to_string();
    };
    let label_width = counts
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut chart = String::new();
    for (label, count) in counts {
        let len = if *count == 0 {
            0
        } else {
            ((*count as f64 / max as f64) * width as f64).round().max(1.0) as usize
        };
        let _ = writeln!(
            chart,
            "{label:<label_width$} | {} {}",
            "█".repeat(len),
            thousands(*count)
        );
    }
    chart
}

/// 1234567 -> "1,234,567"
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("".parse::<Command>(), Ok(Command::Show(ViewState::Home)));
        assert_eq!(
            "jobs  Senior Data Scientist ".parse::<Command>(),
            Ok(Command::Show(ViewState::Jobs {
                query: Some("Senior Data Scientist".to_string())
            }))
        );
        assert_eq!("jobs".parse::<Command>(), Ok(Command::Show(ViewState::Jobs { query: None })));
        assert_eq!("ANALYTICS".parse::<Command>(), Ok(Command::Show(ViewState::Analytics)));
        assert_eq!("reload".parse::<Command>(), Ok(Command::Reload));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("dance".parse::<Command>(), Err(UnknownCommand("dance".to_string())));
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn bars_scale_to_largest_count() {
        let counts = vec![("Data".to_string(), 10), ("Design".to_string(), 5), ("Ops".to_string(), 0)];
        let chart = bar_chart(&counts, 20);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].matches('█').count(), 20);
        assert_eq!(lines[1].matches('█').count(), 10);
        assert!(lines[1].starts_with("Design | "));
        assert_eq!(bar_chart(&[], 20), "(no categories)\n");
    }

    #[test]
    fn stats_page_formats_numbers() {
        let page = render_stats(&CatalogStats {
            total_jobs: 24_681,
            categories: 12,
            countries: 40,
            mean_hourly_rate: 31.6,
        });
        assert!(page.contains("24,681  Total Jobs"));
        assert!(page.contains("$32  Avg Rate/hr"));
    }

    #[test]
    fn recommendation_card_shows_percent_match() {
        let page = render_recommendations(&[Recommendation {
            rank: 1,
            row: 0,
            title: "Data Scientist".to_string(),
            category: "Data".to_string(),
            country: "India".to_string(),
            hourly_rate: Some(40.0),
            link: "https://jobs.example/1".to_string(),
            score: 0.8765,
            percent: 87.7,
        }]);
        assert!(page.contains("#1 Data Scientist"));
        assert!(page.contains("$40/hour"));
        assert!(page.contains("87.7% Match"));
    }

    #[test]
    fn load_failure_renders_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let mut resources = Resources::new(dir.path().join("none.csv"), dir.path().join("none.cbor"));
        let mut out = Vec::new();
        render(&ViewState::Home, &mut resources, &Config::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Failed to load system components"));

        let mut out = Vec::new();
        render(&ViewState::Contact, &mut resources, &Config::default(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("ABC@example.com"));
    }
}
