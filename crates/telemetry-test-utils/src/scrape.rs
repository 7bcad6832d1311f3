//! Minimal Prometheus text exposition parser.
//!
//! Handles the subset the Prometheus exporter emits: `# HELP` / `# TYPE`
//! comments, sample lines with optional quoted labels, and `+Inf` / `-Inf` /
//! `NaN` values. Timestamps are not supported.

/// One sample line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    /// Value of label `name`, if present.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_labels(&self, filter: &[(&str, &str)]) -> bool {
        filter
            .iter()
            .all(|(name, value)| self.label(name) == Some(*value))
    }
}

/// A parsed scrape.
#[derive(Debug, Clone, Default)]
pub struct Scrape {
    samples: Vec<Sample>,
}

impl Scrape {
    /// Parse exposition text. Panics on malformed sample lines.
    pub fn parse(text: &str) -> Self {
        let samples = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                parse_sample(line).unwrap_or_else(|| panic!("malformed sample line: {line}"))
            })
            .collect();
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Value of the first sample named `name` whose labels include `filter`.
    pub fn value(&self, name: &str, filter: &[(&str, &str)]) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.name == name && s.has_labels(filter))
            .map(|s| s.value)
    }

    /// Sum over every sample named `name` whose labels include `filter`.
    pub fn sum(&self, name: &str, filter: &[(&str, &str)]) -> f64 {
        self.samples
            .iter()
            .filter(|s| s.name == name && s.has_labels(filter))
            .map(|s| s.value)
            .sum()
    }

    /// Cumulative count of histogram `name` in the bucket with upper bound `le`.
    pub fn bucket(&self, name: &str, le: f64, filter: &[(&str, &str)]) -> Option<f64> {
        let bucket_name = format!("{name}_bucket");
        self.samples
            .iter()
            .filter(|s| s.name == bucket_name && s.has_labels(filter))
            .find(|s| s.label("le").and_then(parse_value) == Some(le))
            .map(|s| s.value)
    }

    /// Observation count of histogram `name`.
    pub fn histogram_count(&self, name: &str, filter: &[(&str, &str)]) -> Option<f64> {
        self.value(&format!("{name}_count"), filter)
    }
}

fn parse_sample(line: &str) -> Option<Sample> {
    let (name, rest) = match line.find(|c: char| c == '{' || c.is_whitespace()) {
        Some(idx) => line.split_at(idx),
        None => return None,
    };

    let (labels, rest) = if let Some(body) = rest.strip_prefix('{') {
        parse_labels(body)?
    } else {
        (Vec::new(), rest)
    };

    let value = rest.split_whitespace().next().and_then(parse_value)?;

    Some(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

/// Parse `k="v",...}` and return the labels and the remainder after `}`.
fn parse_labels(input: &str) -> Option<(Vec<(String, String)>, &str)> {
    let mut labels = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches([',', ' ']);
        if let Some(after) = rest.strip_prefix('}') {
            return Some((labels, after));
        }

        let eq = rest.find('=')?;
        let key = rest.get(..eq)?.trim().to_string();
        rest = rest.get(eq + 1..)?.strip_prefix('"')?;

        let mut value = String::new();
        let mut chars = rest.char_indices();
        let end = loop {
            let (idx, c) = chars.next()?;
            match c {
                '\\' => match chars.next()?.1 {
                    'n' => value.push('\n'),
                    other => value.push(other),
                },
                '"' => break idx,
                other => value.push(other),
            }
        };

        labels.push((key, value));
        rest = rest.get(end + 1..)?;
    }
}

fn parse_value(s: &str) -> Option<f64> {
    match s {
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}
