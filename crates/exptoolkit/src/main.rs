//! `exptk` - CLI for exptoolkit
//!
//! This binary fills, saves, clears and exports the experiment toolkit
//! forms from the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::warn;

use exptoolkit::cli::{
    Cli, ClearCommand, Command, ConfigCommand, ExportCommand, FillCommand, FormsCommand,
    ShowCommand,
};
use exptoolkit::form::{FieldKind, FieldValue, FormSchema, FormStyle};
use exptoolkit::storage::SaveOutcome;
use exptoolkit::{init_logging, Config, Exporter, FormId, FormRecord, FormView, SnapshotStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config =
        Config::load_from(cli.config.clone()).context("could not load configuration")?;

    // Execute the command
    match cli.command {
        Command::Forms(cmd) => handle_forms(&cmd),
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Fill(cmd) => handle_fill(&config, &cmd),
        Command::Clear(cmd) => handle_clear(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> Result<SnapshotStore> {
    SnapshotStore::from_config(config).with_context(|| {
        format!(
            "could not open snapshot store at {}",
            config.database_path().display()
        )
    })
}

fn style_name(style: FormStyle) -> &'static str {
    match style {
        FormStyle::Checklist => "checklist",
        FormStyle::FreeText => "free-text",
    }
}

fn schema_json(schema: &FormSchema) -> serde_json::Value {
    let fields: Vec<_> = schema
        .fields()
        .map(|field| {
            let options: Vec<_> = match field.kind {
                FieldKind::Choice(options) => options
                    .iter()
                    .map(|opt| json!({ "value": opt.value, "label": opt.label }))
                    .collect(),
                FieldKind::Text | FieldKind::Check => Vec::new(),
            };
            json!({
                "key": field.key,
                "label": field.label,
                "kind": field.kind.name(),
                "options": options,
            })
        })
        .collect();

    json!({
        "form": schema.id,
        "title": schema.title,
        "style": style_name(schema.style),
        "fields": fields,
    })
}

fn handle_forms(cmd: &FormsCommand) -> Result<()> {
    let forms: Vec<FormId> = match cmd.form {
        Some(form) => vec![form.into()],
        None => FormId::ALL.to_vec(),
    };

    if cmd.json {
        let schemas: Vec<_> = forms.iter().map(|form| schema_json(form.schema())).collect();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    if cmd.form.is_none() {
        for form in forms {
            let schema = form.schema();
            println!(
                "{:<10} {:<10} {:>3} fields  {}",
                form.as_str(),
                style_name(schema.style),
                schema.len(),
                schema.title
            );
        }
        return Ok(());
    }

    for form in forms {
        let schema = form.schema();
        println!("{} ({})", schema.title, form);
        for section in schema.sections {
            if !section.title.is_empty() {
                println!();
                println!("[{}]", section.title);
            }
            for field in section.fields {
                print_field_line(field.key, field.label, field.kind);
            }
        }
        if let Some(decision) = &schema.decision {
            println!();
            print_field_line(decision.key, decision.label, decision.kind);
        }
    }
    Ok(())
}

fn print_field_line(key: &str, label: &str, kind: FieldKind) {
    match kind {
        FieldKind::Choice(options) => {
            let values: Vec<_> = options.iter().map(|opt| opt.value).collect();
            println!("  {key:<22} {label} ({})", values.join("|"));
        }
        FieldKind::Text | FieldKind::Check => println!("  {key:<22} {label}"),
    }
}

fn print_record(record: &FormRecord) {
    let schema = record.schema();
    println!("{} ({})", schema.title, record.form());
    for (field, value) in record.entries() {
        match value {
            FieldValue::Flag(checked) => {
                let glyph = if *checked { "[x]" } else { "[ ]" };
                println!("  {glyph} {:<12} {}", field.key, field.label);
            }
            FieldValue::Text(_) => {
                let text = record.display_text(field);
                println!("  {:<22} {}", field.key, text.replace('\n', "\n  "));
            }
        }
    }
    if schema.style == FormStyle::Checklist {
        let items = schema.sections.iter().map(|s| s.fields.len()).sum::<usize>();
        println!();
        println!("  {}/{} items checked", record.checked_count(), items);
    }
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> Result<()> {
    let store = open_store(config)?;
    let view = FormView::mount(&store, cmd.form.into());

    if cmd.json {
        let output = json!({
            "form": view.form(),
            "values": view.record().values(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_record(view.record());
    }
    Ok(())
}

fn handle_fill(config: &Config, cmd: &FillCommand) -> Result<()> {
    if !cmd.has_edits() {
        bail!("nothing to fill; use --set KEY=VALUE, --check KEY or --uncheck KEY");
    }

    let store = open_store(config)?;
    let mut view = FormView::mount(&store, cmd.form.into());
    let form = view.form();

    for assignment in &cmd.set {
        view.set_text(&assignment.key, assignment.value.as_str())
            .with_context(|| format!("could not set '{}' on {form}", assignment.key))?;
    }
    for key in &cmd.check {
        view.set_checked(key, true)
            .with_context(|| format!("could not check '{key}' on {form}"))?;
    }
    for key in &cmd.uncheck {
        view.set_checked(key, false)
            .with_context(|| format!("could not uncheck '{key}' on {form}"))?;
    }

    match view.try_save() {
        Ok(SaveOutcome::Written) => println!("Saved {form}."),
        Ok(SaveOutcome::Unchanged) => println!("No changes to {form}."),
        Err(err) => {
            warn!("Failed to save {} snapshot: {}", form, err);
            println!("Could not save {form}; the previously saved values are kept.");
        }
    }
    Ok(())
}

fn handle_clear(config: &Config, cmd: &ClearCommand) -> Result<()> {
    let store = open_store(config)?;
    let mut view = FormView::mount(&store, cmd.form.into());
    view.clear();

    println!("Cleared {}.", view.form());
    print_record(view.record());
    Ok(())
}

fn handle_export(config: &Config, cmd: ExportCommand) -> Result<()> {
    let store = open_store(config)?;
    let view = FormView::mount(&store, cmd.form.into());

    let mut exporter = Exporter::from_config(config).context("invalid page configuration")?;
    if let Some(format) = cmd.format {
        exporter = exporter.with_format(format.into());
    }
    if let Some(output) = cmd.output {
        exporter = exporter.with_output_dir(output);
    }

    let exported = view
        .export(&exporter, cmd.title.as_deref())
        .with_context(|| format!("export of {} failed", view.form()))?;

    println!(
        "Exported {} ({} page{}, {} bytes) to {}",
        view.form(),
        exported.pages,
        if exported.pages == 1 { "" } else { "s" },
        exported.bytes,
        exported.path.display()
    );
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let snapshots = store.list().context("could not list snapshots")?;

    if json {
        let entries: Vec<_> = snapshots
            .iter()
            .map(|info| {
                json!({
                    "form": info.form,
                    "key": info.key,
                    "saved_at": info.saved_at,
                    "size_bytes": info.size_bytes,
                    "digest": info.digest,
                })
            })
            .collect();
        let status = json!({
            "database_path": store.path(),
            "snapshots": entries,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("exptk status");
    println!("------------");
    println!("Database:      {}", store.path().display());
    println!();
    if snapshots.is_empty() {
        println!("No saved forms.");
        return Ok(());
    }
    for info in &snapshots {
        let saved_at = info.saved_at.map_or_else(
            || "unknown".to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        println!(
            "{:<10} saved {}  {:>6} bytes  {}",
            info.form.as_str(),
            saved_at,
            info.size_bytes,
            &info.digest[..info.digest.len().min(12)]
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Key prefix:         {}", config.storage.key_prefix);
                match config.snapshot_quota() {
                    Some(limit) => println!("  Max snapshot bytes: {limit}"),
                    None => println!("  Max snapshot bytes: unlimited"),
                }
                println!();
                println!("[Export]");
                println!("  Output directory:   {}", config.output_dir().display());
                println!("  Format:             {}", config.export.format.extension());
                println!();
                println!("[Page]");
                println!(
                    "  Size (mm):          {} x {}",
                    config.page.width, config.page.height
                );
                println!("  Line height (mm):   {}", config.page.line_height);
                println!("  Text width (mm):    {}", config.page.text_width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
