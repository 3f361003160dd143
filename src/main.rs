use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use feedback_insights::aggregate::{filter_and_sort, DepartmentFilter, SortKey, StatusFilter};
use feedback_insights::config::{AnalyzerConfig, WorkflowTimings};
use feedback_insights::models::{Department, Status, Submission};
use feedback_insights::pipeline::SAMPLE_TEXTS;
use feedback_insights::report::{self, ReportScope};
use feedback_insights::store::FeedbackStore;
use feedback_insights::workflow::{
    demo_samples, Clock, Priority, SystemClock, Workflow, WorkflowEvent, WorkflowState,
};
use feedback_insights::FeedbackAnalyzer;

mod logging;

#[derive(Parser)]
#[command(name = "feedback-insights")]
#[command(about = "Sentiment, theme and insight analysis for customer feedback", long_about = None)]
struct Cli {
    /// JSON file replacing the built-in lexicon and theme catalog
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Feedback CSV; the curated sample records are used when omitted
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct Query {
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long, default_value = "date")]
    sort: SortKey,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and tag a single text
    Classify {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Run the dashboard analysis over texts, one per line
    Analyze {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// List feedback records with admin filters
    List {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        query: Query,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        query: Query,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write the curated sample records to a CSV file
    Seed {
        #[arg(long)]
        out: PathBuf,
    },
    /// Add a feedback submission to a CSV file
    Submit {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        score: u8,
        #[arg(long)]
        message: String,
        #[arg(long)]
        department: Option<Department>,
    },
    /// Change the review status of a record in a CSV file
    SetStatus {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        status: Status,
    },
    /// Run the live classification demo
    Demo {
        /// Stop after this many classified samples
        #[arg(long)]
        cycles: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, &cli.log_format);

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = FeedbackAnalyzer::new(&config);

    match cli.command {
        Commands::Classify { text, json } => {
            let classification = analyzer.classify(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&classification)?);
            } else {
                let themes = if classification.themes.is_empty() {
                    "none".to_string()
                } else {
                    classification.themes.join(", ")
                };
                println!(
                    "{} ({:.2}), themes: {}",
                    classification.label, classification.score, themes
                );
            }
        }
        Commands::Analyze { input, json } => {
            let texts = match input {
                Some(path) => read_texts(&path)?,
                None => SAMPLE_TEXTS.iter().map(|text| text.to_string()).collect(),
            };
            let analysis = analyzer.analyze_texts(&texts);

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }

            println!(
                "Analyzed {} texts: {} positive, {} negative, {} neutral.",
                analysis.overall.total_reviews,
                analysis.overall.positive_count,
                analysis.overall.negative_count,
                analysis.overall.neutral_count
            );
            for theme in &analysis.themes {
                println!(
                    "- {}: {} mentions, {:.1}% satisfaction",
                    theme.tally.theme, theme.tally.total, theme.satisfaction_pct
                );
            }
            for insight in &analysis.synthesis.insights {
                println!("[{}] {}", insight.kind.as_str(), insight.message);
            }
            for recommendation in &analysis.synthesis.recommendations {
                println!("-> {}", recommendation.message);
            }
        }
        Commands::List {
            source,
            query,
            limit,
        } => {
            let store = load_store(source.csv.as_deref(), &analyzer)?;
            let department = DepartmentFilter::parse(query.department.as_deref());
            let status = StatusFilter::parse(query.status.as_deref());
            let records = filter_and_sort(store.records(), &department, &status, query.sort);

            if records.is_empty() {
                println!("No feedback matches these filters.");
                return Ok(());
            }

            println!("{} matching reviews:", records.len());
            for record in records.iter().take(limit) {
                println!(
                    "- {} {} ({}, {}) {}/5 {} [{}]: {}",
                    record.id,
                    record.name,
                    record.department.display_name(),
                    record.created_at.date_naive(),
                    record.score,
                    record.sentiment,
                    record.status,
                    record.message
                );
            }
        }
        Commands::Report { source, query, out } => {
            let store = load_store(source.csv.as_deref(), &analyzer)?;
            let department = DepartmentFilter::parse(query.department.as_deref());
            let status = StatusFilter::parse(query.status.as_deref());
            let analysis = analyzer.analyze(store.records());
            let scope = ReportScope {
                department: &department,
                status: &status,
                sort: query.sort,
            };
            let report = report::build_report(store.records(), &analysis, &scope);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Seed { out } => {
            let store = FeedbackStore::seeded(&analyzer);
            store
                .save_csv(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} seed records to {}.", store.len(), out.display());
        }
        Commands::Submit {
            csv,
            name,
            email,
            score,
            message,
            department,
        } => {
            let mut store = if csv.exists() {
                load_store(Some(&csv), &analyzer)?
            } else {
                FeedbackStore::default()
            };
            let submission = Submission {
                name,
                email,
                score,
                message,
                department,
            };
            let record = store.submit(submission, &analyzer)?;
            println!(
                "Stored {} as {} feedback for {}.",
                record.id,
                record.sentiment,
                record.department.display_name()
            );
            store
                .save_csv(&csv)
                .with_context(|| format!("failed to write {}", csv.display()))?;
        }
        Commands::SetStatus { csv, id, status } => {
            let mut store = load_store(Some(&csv), &analyzer)?;
            if !store.set_status(id, status) {
                println!("No feedback with id {id}; nothing changed.");
                return Ok(());
            }
            store
                .save_csv(&csv)
                .with_context(|| format!("failed to write {}", csv.display()))?;
            println!("Marked {id} as {status}.");
        }
        Commands::Demo { cycles } => {
            run_demo(analyzer, cycles).await?;
        }
    }

    Ok(())
}

fn load_store(csv: Option<&Path>, analyzer: &FeedbackAnalyzer) -> anyhow::Result<FeedbackStore> {
    match csv {
        Some(path) => FeedbackStore::load_csv(path, analyzer)
            .with_context(|| format!("failed to read feedback from {}", path.display())),
        None => Ok(FeedbackStore::seeded(analyzer)),
    }
}

fn read_texts(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let texts: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if texts.is_empty() {
        bail!("{} contains no feedback texts", path.display());
    }
    Ok(texts)
}

async fn run_demo(analyzer: FeedbackAnalyzer, cycles: Option<usize>) -> anyhow::Result<()> {
    let mut workflow = Workflow::new(
        SystemClock::new(),
        analyzer,
        demo_samples(),
        WorkflowTimings::default(),
    )?;
    workflow.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    'run: loop {
        let wait = workflow
            .next_due()
            .map(|due| due.saturating_sub(workflow.clock().now()))
            .unwrap_or_default();

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                for event in workflow.poll() {
                    match event {
                        WorkflowEvent::StateChanged { to: WorkflowState::Submitting, .. } => {
                            println!("> {}", workflow.current_sample().text);
                        }
                        WorkflowEvent::Classified {
                            category,
                            sentiment,
                            confidence,
                            priority,
                            classification,
                            ..
                        } => {
                            let alert = if priority == Priority::High { " [!]" } else { "" };
                            println!(
                                "  routed to {category} as {sentiment}{alert}, confidence {confidence}%, priority {priority} (lexicon: {} {:.2})",
                                classification.label, classification.score
                            );
                            if let Some(snapshot) = workflow.snapshot() {
                                let processed = snapshot.context.total_processed();
                                println!(
                                    "  processed {processed}, {:.1}% positive",
                                    snapshot.context.positive_share_pct()
                                );
                                if cycles.is_some_and(|limit| processed >= limit) {
                                    break 'run;
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ = &mut ctrl_c => break 'run,
        }
    }

    if let Some(context) = workflow.stop() {
        println!("Demo stopped after {} samples.", context.total_processed());
        for (category, counts) in context.counts() {
            println!(
                "- {category}: {} positive, {} negative",
                counts.positive, counts.negative
            );
        }
    }

    Ok(())
}
