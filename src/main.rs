use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use treeform::kernel::services::adapters::json::document_ref_for;
use treeform::kernel::services::adapters::{
    ensure_settings_file, json_collaborators, load_settings, load_settings_from, AsyncRuntime,
    JsonDocument, JsonLabelProvider,
};
use treeform::kernel::services::ports::Settings;
use treeform::kernel::EditorSession;
use treeform::script::{parse_script, render_tree, ScriptRunner};

mod logging;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

struct Args {
    document: PathBuf,
    script: Option<PathBuf>,
    settings: Option<PathBuf>,
    save: bool,
}

fn usage() -> &'static str {
    "usage: treeform <document.json> [--script <steps.json>] [--settings <settings.json>] [--save]"
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut document = None;
    let mut script = None;
    let mut settings = None;
    let mut save = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--script" => script = Some(args.next().ok_or("--script needs a path")?.into()),
            "--settings" => settings = Some(args.next().ok_or("--settings needs a path")?.into()),
            "--save" => save = true,
            "-h" | "--help" => return Err(usage().to_string()),
            other if other.starts_with("--") => return Err(format!("unknown flag {}", other)),
            other => document = Some(PathBuf::from(other)),
        }
    }

    Ok(Args {
        document: document.ok_or_else(|| usage().to_string())?,
        script,
        settings,
        save,
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings: Settings = match &args.settings {
        Some(path) => load_settings_from(path)?,
        None => {
            if let Err(e) = ensure_settings_file() {
                eprintln!("treeform: cannot create default settings: {}", e);
            }
            load_settings()
        }
    };
    let log_guard = logging::init(settings.log_filter.as_deref());

    let document = JsonDocument::load(&args.document)?;
    let json_settings = Arc::new(settings.json.clone());
    let collaborators =
        json_collaborators(&document, Arc::clone(&json_settings), args.document.clone());

    let runtime = AsyncRuntime::new()?;
    let root_ref = document.root_ref();
    let mut session = EditorSession::open(
        runtime.tokio_handle(),
        collaborators,
        document_ref_for(&args.document),
        &document.snapshot(),
        root_ref,
        settings.session.clone(),
    )?;

    if let Some(path) = &args.script {
        let steps = parse_script(&std::fs::read_to_string(path)?)?;
        let failures = ScriptRunner::new(&mut session, &document, SETTLE_TIMEOUT).run(steps);
        for (index, err) in &failures {
            eprintln!("step {}: {}", index, err);
        }
    }

    let saved = if args.save {
        session.save_and_wait(SETTLE_TIMEOUT)
    } else {
        Ok(())
    };

    let labels = JsonLabelProvider::new(document.clone(), json_settings);
    print!("{}", render_tree(session.store(), &labels));
    let notes = session.store_mut().take_notifications();
    for note in &notes {
        eprintln!("[{:?}] {}", note.kind, note.message);
    }
    if let (false, Some(guard)) = (notes.is_empty(), &log_guard) {
        eprintln!("details in {}", guard.log_dir().display());
    }
    if session.store().is_dirty() {
        eprintln!("unsaved changes");
    }
    saved?;
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "treeform failed");
            eprintln!("treeform: {}", e);
            ExitCode::FAILURE
        }
    }
}
