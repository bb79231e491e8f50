use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use what_topic::commands::{self, BreakdownOptions, SimilarOptions};
use what_topic::report::{self, Summary};
use what_topic::{frequent_terms, label_models, top_terms, AnalysisConfig, AnalysisError, Corpus, Prompter, TopicModel};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[clap(short, long, global = true, help = "JSON config file; flags given on the command line win")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Top terms of every topic in a model
    TopTerms {
        model: PathBuf,
        #[clap(short = 'n', long)]
        top_n: Option<usize>,
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
    /// Ranked topic shares of documents, small topics folded into "others"
    Breakdown {
        model: PathBuf,
        #[clap(short, long = "doc", required = true)]
        docs: Vec<usize>,
        #[clap(short, long, help = "Major topic threshold in percent, whatever the scale")]
        threshold: Option<f64>,
        #[clap(long, help = "Report shares on a 0-1 scale instead of 0-100")]
        fraction: bool,
        #[clap(long, help = "Write doc<N>_data.csv files here instead of JSON on stdout")]
        out_dir: Option<PathBuf>,
    },
    /// Label counts among the documents most similar to each reference document
    Similar {
        corpus: PathBuf,
        #[clap(short, long = "doc", required = true)]
        docs: Vec<usize>,
        #[clap(short = 'k', long)]
        neighbors: Option<usize>,
        #[clap(short, long, help = "Collapse newsgroup labels into their general category")]
        general: bool,
        #[clap(long, help = "Write document_<N>_data.csv files here instead of JSON on stdout")]
        out_dir: Option<PathBuf>,
    },
    /// Most frequent terms of one document
    Frequent {
        corpus: PathBuf,
        #[clap(short, long)]
        doc: usize,
        #[clap(short = 'n', long)]
        top_n: Option<usize>,
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
    /// Interactively name the topics of one or more models
    Label {
        #[clap(required = true)]
        models: Vec<PathBuf>,
        #[clap(short, long, help = "Write the last labeled model, with its labels, to this file")]
        out: Option<PathBuf>,
    },
}

struct TerminalPrompter {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TerminalPrompter {
    fn new() -> Self {
        TerminalPrompter {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn show(&mut self, line: &str) -> what_topic::Result<()> {
        writeln!(self.stdout, "{line}")?;
        Ok(())
    }

    fn ask(&mut self, question: &str) -> what_topic::Result<String> {
        write!(self.stdout, "{question}")?;
        self.stdout.flush()?;
        let mut answer = String::new();
        if self.stdin.lock().read_line(&mut answer)? == 0 {
            return Err(AnalysisError::InvalidInput("input closed while labeling".to_string()));
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    debug!(?args, "parsed arguments");

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(args.config.as_deref()).context("loading config")?;

    match args.command {
        Command::TopTerms { model, top_n, out } => {
            let model = load_model(&model)?;
            let topics = top_terms(&model.topic_terms, &model.terms, top_n.unwrap_or(config.top_terms))?;
            let mut writer = output(out.as_deref())?;
            report::write_topics_csv(&mut writer, &model.labels(), &topics)?;
            writer.flush()?;
        }
        Command::Breakdown {
            model,
            docs,
            threshold,
            fraction,
            out_dir,
        } => {
            let model = load_model(&model)?;
            let options = BreakdownOptions::resolve(&config, threshold, fraction);
            let breakdowns = commands::document_breakdowns(&model, &docs, &options, out_dir.as_deref())?;
            if out_dir.is_none() {
                Summary::new("breakdown", breakdowns).write_json(&mut io::stdout().lock())?;
            }
        }
        Command::Similar {
            corpus,
            docs,
            neighbors,
            general,
            out_dir,
        } => {
            let corpus = Corpus::from_file(&corpus).with_context(|| format!("loading corpus {}", corpus.display()))?;
            let options = SimilarOptions::resolve(&config, neighbors, general);
            let tallies = commands::neighbour_tallies(&corpus, &docs, &options, out_dir.as_deref())?;
            if out_dir.is_none() {
                Summary::new("similar", tallies).write_json(&mut io::stdout().lock())?;
            }
        }
        Command::Frequent { corpus, doc, top_n, out } => {
            let corpus = Corpus::from_file(&corpus).with_context(|| format!("loading corpus {}", corpus.display()))?;
            let top_n = top_n.unwrap_or(config.frequent_terms);
            let terms = frequent_terms(corpus.document_terms(doc)?, &corpus.terms, top_n)?;
            let mut writer = output(out.as_deref())?;
            report::write_terms_csv(&mut writer, &terms, top_n)?;
            writer.flush()?;
        }
        Command::Label { models, out } => {
            let models = models.iter().map(|p| load_model(p)).collect::<anyhow::Result<Vec<_>>>()?;
            run_label(&models, &config, out.as_deref())?;
        }
    }
    Ok(())
}

fn load_model(path: &Path) -> anyhow::Result<TopicModel> {
    TopicModel::from_file(path).with_context(|| format!("loading model {}", path.display()))
}

fn output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn run_label(models: &[TopicModel], config: &AnalysisConfig, out: Option<&Path>) -> anyhow::Result<()> {
    let runs = commands::topic_runs(models, config.top_terms)?;

    let mut prompter = TerminalPrompter::new();
    let labeled = label_models(&mut prompter, &runs, config.min_shared_terms)?;

    let Some((components, labels)) = labeled.last_key_value() else {
        bail!("no topics were labeled");
    };
    info!(runs = labeled.len(), components, "labeling finished");

    if let Some(path) = out {
        let labeled_model = commands::labeled_model(models, *components, labels)?;
        fs::write(path, serde_json::to_string_pretty(&labeled_model)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote labeled model");
    }

    Summary::new("labels", &labeled).write_json(&mut io::stdout().lock())?;
    Ok(())
}
