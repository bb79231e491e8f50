//! Human labeling of topic runs.
//!
//! Each run is a topic model fitted with some number of components. Labels
//! picked for one run are offered again for the topics of the next run that
//! share enough top terms with them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};

/// Labels chosen for the topics of one run, in topic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLabels {
    entries: Vec<(String, BTreeSet<String>)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelDiff {
    pub added: Vec<String>,
    pub discarded: Vec<String>,
}

impl TopicLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `label` naming a topic with `terms`.
    pub fn with_label(mut self, label: impl Into<String>, terms: &[String]) -> Result<Self> {
        let label = label.into();
        if self.contains(&label) {
            return Err(AnalysisError::LabelInUse(label));
        }
        self.entries.push((label, terms.iter().cloned().collect()));
        Ok(self)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|(l, _)| l == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn diff(&self, previous: &TopicLabels) -> LabelDiff {
        LabelDiff {
            added: self.labels().filter(|l| !previous.contains(l)).map(String::from).collect(),
            discarded: previous.labels().filter(|l| !self.contains(l)).map(String::from).collect(),
        }
    }
}

/// Previous label(s) whose term set overlaps most with `terms`.
///
/// Only overlaps strictly larger than `min_shared` count. Labels tied for the
/// largest overlap are joined with a space.
pub fn suggest_label(previous: &TopicLabels, terms: &[String], min_shared: usize) -> Option<String> {
    let terms: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
    let shared: Vec<(&str, usize)> = previous
        .entries
        .iter()
        .map(|(label, set)| (label.as_str(), set.iter().filter(|t| terms.contains(t.as_str())).count()))
        .collect();

    let best = shared.iter().map(|(_, n)| *n).max()?;
    if best <= min_shared {
        return None;
    }
    let labels: Vec<&str> = shared
        .into_iter()
        .filter(|(_, n)| *n == best)
        .map(|(label, _)| label)
        .collect();
    Some(labels.join(" "))
}

/// Terminal seam for the labeling driver.
pub trait Prompter {
    fn show(&mut self, line: &str) -> Result<()>;
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Top terms of every topic of a model fitted with `components` topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRun {
    pub components: usize,
    pub topics: Vec<Vec<String>>,
}

fn ask_fresh_label<P: Prompter>(prompter: &mut P, labels: &TopicLabels, question: &str) -> Result<String> {
    let mut question = question.to_string();
    loop {
        let answer = prompter.ask(&question)?.trim().to_string();
        if answer.is_empty() {
            question = "Label cannot be empty. What label do you want to set? ".to_string();
        } else if labels.contains(&answer) {
            question = "Label is already in use. What label do you want to set? ".to_string();
        } else {
            return Ok(answer);
        }
    }
}

fn ask_yes_no<P: Prompter>(prompter: &mut P, question: &str) -> Result<bool> {
    loop {
        match prompter.ask(question)?.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

/// Label one run given the labels of the run before it (if any).
pub fn label_run<P: Prompter>(
    prompter: &mut P,
    run: &TopicRun,
    previous: Option<&TopicLabels>,
    min_shared: usize,
) -> Result<TopicLabels> {
    let mut labels = TopicLabels::new();
    for terms in &run.topics {
        prompter.show(&terms.join(" "))?;
        let label = match previous {
            None => ask_fresh_label(prompter, &labels, "What label do you want to set? ")?,
            Some(previous) => {
                let suggestion = suggest_label(previous, terms, min_shared);
                prompter.show(&format!(
                    "previous label(s): {}",
                    suggestion.as_deref().unwrap_or("N/A")
                ))?;
                match suggestion {
                    Some(s) if labels.contains(&s) => ask_fresh_label(
                        prompter,
                        &labels,
                        "Label is already in use. What label do you want to set? ",
                    )?,
                    Some(s) => {
                        if ask_yes_no(prompter, "keep label?(y/n): ")? {
                            s
                        } else {
                            ask_fresh_label(prompter, &labels, "What label do you want to set? ")?
                        }
                    }
                    None => ask_fresh_label(prompter, &labels, "What label do you want to set? ")?,
                }
            }
        };
        debug!(components = run.components, label = %label, "topic labeled");
        labels = labels.with_label(label, terms)?;
    }
    Ok(labels)
}

/// Labels runs in increasing number of components until the user stops.
///
/// Every run must have a distinct number of components.
///
/// Returns the labels of every run that was labeled, keyed by its number of
/// components.
pub fn label_models<P: Prompter>(
    prompter: &mut P,
    runs: &[TopicRun],
    min_shared: usize,
) -> Result<BTreeMap<usize, TopicLabels>> {
    let mut ordered: Vec<&TopicRun> = runs.iter().collect();
    ordered.sort_by_key(|run| run.components);
    if let Some(pair) = ordered.windows(2).find(|pair| pair[0].components == pair[1].components) {
        return Err(AnalysisError::InvalidInput(format!(
            "more than one model has {} topics",
            pair[0].components
        )));
    }

    let mut labeled: BTreeMap<usize, TopicLabels> = BTreeMap::new();
    let mut previous: Option<TopicLabels> = None;

    for (i, run) in ordered.iter().enumerate() {
        info!(components = run.components, "labeling topics");
        prompter.show(&format!("Looking at {} topics.", run.components))?;

        let labels = label_run(prompter, run, previous.as_ref(), min_shared)?;
        prompter.show(&format!("labels: {}", labels.labels().collect::<Vec<_>>().join(", ")))?;
        if let Some(previous) = &previous {
            let diff = labels.diff(previous);
            prompter.show(&format!("newly set labels: {}", diff.added.join(", ")))?;
            prompter.show(&format!("discarded labels: {}", diff.discarded.join(", ")))?;
        }

        labeled.insert(run.components, labels.clone());
        previous = Some(labels);

        let is_last = i + 1 == ordered.len();
        if !is_last && !ask_yes_no(prompter, "add more topics?(y/n) ")? {
            break;
        }
    }

    Ok(labeled)
}
