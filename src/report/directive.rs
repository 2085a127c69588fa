// Plot directive extraction: `\p{x, y(0, 2)[1e3], ...} (xlabel, ylabel, title)`

use crate::core::constants::ARTIFACT_EXTENSION;
use crate::core::error::{LabnoteError, Result};
use crate::core::format::{Labels, PlotRequest, SeriesRef, VarRef};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

struct DirectivePatterns {
    callout: Regex,
    variable: Regex,
    index: Regex,
}

static DIRECTIVE_PATTERNS: OnceLock<DirectivePatterns> = OnceLock::new();

fn patterns() -> &'static DirectivePatterns {
    DIRECTIVE_PATTERNS.get_or_init(|| DirectivePatterns {
        // At most one newline between the `{}` and `()` groups. Labels may
        // hold one level of balanced parentheses.
        callout: Regex::new(
            r"\\p\{(?P<vars>[^{}\n]+)\}[ \t]*(?:\r?\n)?[ \t]*\((?P<labels>[^()\n]*(?:\([^()\n]*\)[^()\n]*)*)\)",
        )
        .expect("built-in callout pattern"),
        // name, then optional (i, j, ...), then optional [scale]
        variable: Regex::new(
            r"(?P<name>[\w\s]+)(?P<runs>\((?:\s*\d+\s*,)*\s*\d+\s*\))?(?P<scale>\[\s*[-\d.+Ee]+\s*\])?,?",
        )
        .expect("built-in variable pattern"),
        index: Regex::new(r"\d+").expect("built-in index pattern"),
    })
}

/// Text with its directives swapped for image links, and the plots those
/// directives asked for, in textual order.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub requests: Vec<PlotRequest>,
}

/// Replace every plot directive in `text` with a markdown image link.
/// Y variables without their own run list plot `default_runs`.
pub fn extract_directives(text: &str, default_runs: &[usize]) -> Result<Extraction> {
    let mut out = String::with_capacity(text.len());
    let mut requests = Vec::new();
    let mut last = 0;

    for caps in patterns().callout.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        let request = parse_callout(&caps, default_runs)?;
        debug!("directive {:?} -> {}", whole.as_str(), request.artifact);

        out.push_str(&text[last..whole.start()]);
        out.push_str(&format!("![]({})", request.artifact.replace(' ', "%20")));
        last = whole.end();
        requests.push(request);
    }
    out.push_str(&text[last..]);

    Ok(Extraction { text: out, requests })
}

fn parse_callout(caps: &Captures<'_>, default_runs: &[usize]) -> Result<PlotRequest> {
    let labels = parse_labels(&caps["labels"])?;
    let mut vars = parse_variables(&caps["vars"])?.into_iter();

    let (x_name, _, x_scale) = vars
        .next()
        .ok_or_else(|| LabnoteError::InvalidDirective(format!("no variables in {{{}}}", &caps["vars"])))?;

    let y = vars
        .map(|(name, runs, scale)| SeriesRef {
            name,
            scale,
            runs: if runs.is_empty() { default_runs.to_vec() } else { runs },
        })
        .collect();

    Ok(PlotRequest {
        artifact: format!("{}.{}", labels.title, ARTIFACT_EXTENSION),
        labels,
        x: VarRef {
            name: x_name,
            scale: x_scale,
        },
        y,
    })
}

fn parse_labels(raw: &str) -> Result<Labels> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [x, y, title] = parts.as_slice() else {
        return Err(LabnoteError::InvalidDirective(format!(
            "expected (xlabel, ylabel, title), got ({})",
            raw
        )));
    };
    if title.is_empty() || title.contains(['/', '\\']) {
        return Err(LabnoteError::InvalidDirective(format!(
            "title {:?} cannot name a file",
            title
        )));
    }
    Ok(Labels {
        x: x.to_string(),
        y: y.to_string(),
        title: title.to_string(),
    })
}

/// `(name, runs, scale)` for each entry of a variable list.
fn parse_variables(raw: &str) -> Result<Vec<(String, Vec<usize>, f64)>> {
    let p = patterns();
    p.variable
        .captures_iter(raw)
        .map(|caps| {
            let name = caps["name"].trim().to_string();
            if name.is_empty() {
                return Err(LabnoteError::InvalidDirective(format!(
                    "empty variable name in {{{}}}",
                    raw
                )));
            }

            let runs = match caps.name("runs") {
                Some(m) => p
                    .index
                    .find_iter(m.as_str())
                    .map(|n| {
                        n.as_str().parse::<usize>().map_err(|e| {
                            LabnoteError::InvalidDirective(format!("run index {}: {}", n.as_str(), e))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };

            let scale = match caps.name("scale") {
                Some(m) => {
                    let s = m.as_str().trim_matches(['[', ']']).trim();
                    s.parse::<f64>().map_err(|e| {
                        LabnoteError::InvalidDirective(format!("scale [{}]: {}", s, e))
                    })?
                }
                None => 1.0,
            };

            Ok((name, runs, scale))
        })
        .collect()
}
