use acadcheck_lib::models::{HighlightSpan, Report, MAX_NGRAM, MIN_NGRAM};
use acadcheck_lib::services::corpus_store::{add_file, CorpusStore, JsonCorpusStore, MemoryCorpus};
use acadcheck_lib::services::extraction::extract_file;
use acadcheck_lib::services::highlight::{report_highlight_groups, resolve_highlights_bounded};
use acadcheck_lib::services::{analyze_with_store, AppConfig, ConfigStore};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const USAGE: &str = "Usage:
  acadcheck analyze <path> [--ngram <3-7>] [--no-corpus] [--highlight] [--sentences <n>] [--out <json_path>]
  acadcheck corpus add <path>...
  acadcheck corpus list
  acadcheck corpus count
  acadcheck corpus clear
  acadcheck config show
  acadcheck config set-ngram <3-7>
  acadcheck config set-corpus <json_path>

Options:
  --config-dir <dir>   read config.json from <dir> instead of the user config directory

Supported inputs: .txt, .pdf, .docx. Analysis runs fully offline against the local corpus.";

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// Positional arguments, skipping flags and the values of flags that take one.
fn positionals(args: &[String]) -> Vec<String> {
    const WITH_VALUE: &[&str] = &["--ngram", "--sentences", "--out", "--config-dir"];
    let mut out = Vec::new();
    let mut skip = false;
    for a in args {
        if skip {
            skip = false;
            continue;
        }
        if WITH_VALUE.contains(&a.as_str()) {
            skip = true;
            continue;
        }
        if a.starts_with("--") {
            continue;
        }
        out.push(a.clone());
    }
    out
}

fn config_store(args: &[String]) -> Option<ConfigStore> {
    parse_arg_value(args, "--config-dir")
        .map(PathBuf::from)
        .or_else(ConfigStore::default_config_dir)
        .map(ConfigStore::new)
}

fn load_config(args: &[String]) -> Result<AppConfig> {
    match config_store(args) {
        Some(store) => store
            .load()
            .map_err(anyhow::Error::msg)
            .context("loading configuration"),
        None => Ok(AppConfig::default()),
    }
}

fn render_spans(spans: &[HighlightSpan]) -> String {
    spans
        .iter()
        .map(|s| match &s.style {
            Some(style) => format!("[[{}: {}]]", style, s.text),
            None => s.text.clone(),
        })
        .collect()
}

fn print_report(report: &Report, sentences_n: usize) {
    println!("AI score: {}%", report.ai_score);
    println!("Plagiarism: {}%", report.plagiarism);
    println!("Sentences: {}", report.sentences.len());
    for (i, s) in report.sentences.iter().take(sentences_n).enumerate() {
        println!(
            "[S{:04}] ai={:>3} plg={:>3} src={}  {}",
            i,
            s.ai,
            s.plagiarism,
            s.source.as_deref().unwrap_or("-"),
            preview(&s.sentence, 100)
        );
    }
    if report.sentences.len() > sentences_n {
        println!("... ({} more sentences)", report.sentences.len() - sentences_n);
    }
}

fn run_analyze(args: &[String], config: &AppConfig) -> Result<()> {
    let pos = positionals(args);
    let Some(path) = pos.get(1) else {
        bail!("missing input path\n\n{}", USAGE);
    };
    let path = Path::new(path);

    let text = extract_file(path).with_context(|| format!("extracting {}", path.display()))?;

    let mut ngram = config.analysis.ngram;
    if let Some(n) = parse_arg_value(args, "--ngram") {
        ngram = n.parse().with_context(|| format!("invalid --ngram value '{}'", n))?;
    }
    let sentences_n: usize = parse_arg_value(args, "--sentences")
        .and_then(|s| s.parse().ok())
        .unwrap_or(50);

    println!("File: {}", path.display());
    println!("Extracted: {} chars", text.chars().count());
    println!("N-gram size: {}", ngram.clamp(MIN_NGRAM, MAX_NGRAM));

    let report = if has_flag(args, "--no-corpus") {
        println!("Corpus: none");
        analyze_with_store(&text, &MemoryCorpus::default(), Some(ngram))
    } else {
        let store = JsonCorpusStore::new(config.corpus_file());
        println!("Corpus: {}", store.path().display());
        analyze_with_store(&text, &store, Some(ngram))
    };
    println!();
    print_report(&report, sentences_n);

    if has_flag(args, "--highlight") {
        let groups = report_highlight_groups(&report);
        let lines: Vec<&str> = text.lines().collect();
        println!();
        for spans in resolve_highlights_bounded(&lines, &groups, config.highlight.max_units) {
            println!("{}", render_spans(&spans));
        }
    }

    if let Some(out_path) = parse_arg_value(args, "--out") {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        std::fs::write(&out_path, json).with_context(|| format!("writing {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

fn run_corpus(args: &[String], config: &AppConfig) -> Result<()> {
    let pos = positionals(args);
    let mut store = JsonCorpusStore::new(config.corpus_file());

    match pos.get(1).map(String::as_str) {
        Some("add") => {
            let files = &pos[2..];
            if files.is_empty() {
                bail!("corpus add needs at least one file\n\n{}", USAGE);
            }
            for f in files {
                let id = add_file(&mut store, Path::new(f)).with_context(|| format!("adding {}", f))?;
                println!("Added {} ({})", f, id);
            }
        }
        Some("list") => {
            let docs = store.documents().context("reading corpus")?;
            for d in &docs {
                println!(
                    "{}  {}  {} chars  {}",
                    d.id,
                    d.added_at.format("%Y-%m-%d %H:%M:%S"),
                    d.text.chars().count(),
                    d.name
                );
            }
            println!("{} document(s) in {}", docs.len(), store.path().display());
        }
        Some("count") => {
            println!("{}", store.count().context("reading corpus")?);
        }
        Some("clear") => {
            store.clear().context("clearing corpus")?;
            println!("Corpus cleared");
        }
        _ => bail!("unknown corpus command\n\n{}", USAGE),
    }
    Ok(())
}

fn run_config(args: &[String]) -> Result<()> {
    let pos = positionals(args);
    let Some(store) = config_store(args) else {
        bail!("no configuration directory available; pass --config-dir");
    };

    let config = match (pos.get(1).map(String::as_str), pos.get(2)) {
        (Some("show"), _) => store.load().map_err(anyhow::Error::msg)?,
        (Some("set-ngram"), Some(n)) => {
            let n: usize = n.parse().with_context(|| format!("invalid n-gram size '{}'", n))?;
            store.set_ngram(n).map_err(anyhow::Error::msg)?
        }
        (Some("set-corpus"), Some(p)) => store
            .set_corpus_path(Path::new(p))
            .map_err(anyhow::Error::msg)?,
        _ => bail!("unknown config command\n\n{}", USAGE),
    };

    println!("{}", serde_json::to_string_pretty(&config).context("serializing config")?);
    println!("Config file: {}", store.config_file().display());
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || has_flag(&args, "--help") || has_flag(&args, "-h") {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    acadcheck_lib::init_logging();
    let config = load_config(&args)?;
    info!(command = %args[0], corpus = %config.corpus_file().display(), "cli.start");

    match args[0].as_str() {
        "analyze" => run_analyze(&args, &config),
        "corpus" => run_corpus(&args, &config),
        "config" => run_config(&args),
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }
}
