//! Ingest commands: the staged upload wizard and pipeline runs.
//!
//! `dramp upload` drives the full wizard against the console: step 1
//! (file summary), step 2 (structure), step 3 (validation or metadata
//! entry), then the final commit. Blocking validation errors refuse
//! the commit with exit code 11.

use std::path::Path;

use dataramp_wizard::{IngestContext, IngestWizard, StepData, StepNumber, WizardError};

use crate::exit_codes::{EXIT_UPSTREAM, EXIT_VALIDATION_BLOCKED};
use crate::{api_error, make_client, CliError};

fn wizard_error(e: WizardError) -> CliError {
    match e {
        WizardError::BlockedByValidation => CliError {
            code: EXIT_VALIDATION_BLOCKED,
            message: "Upload blocked by validation errors".into(),
            hint: None,
        },
        WizardError::AnalysisFailed(msg) | WizardError::UploadFailed(msg) => CliError {
            code: EXIT_UPSTREAM,
            message: msg,
            hint: None,
        },
        other => CliError::general(other.to_string()),
    }
}

fn parse_column_description(spec: &str) -> Result<(String, String), CliError> {
    spec.split_once('=')
        .map(|(col, text)| (col.to_string(), text.to_string()))
        .filter(|(col, _)| !col.is_empty())
        .ok_or_else(|| {
            CliError::usage(
                format!("Invalid column description '{}'", spec),
                Some("expected COL=TEXT".into()),
            )
        })
}

fn print_step(wizard: &IngestWizard, step: StepNumber) {
    match wizard.step_data(step) {
        Some(StepData::Summary(s)) => {
            println!("File:    {} ({}, {})", s.file_name, s.size, s.file_type);
            println!("When:    {} {}", s.upload_date, s.upload_time);
            if let (Some(product), Some(dataset)) = (&s.product, &s.dataset) {
                println!("Target:  {}/{}", product, dataset);
            }
        }
        Some(StepData::Structure(r)) => {
            println!("Columns: {}  Records: {}", r.column_count, r.record_count);
            for col in &r.columns {
                println!("  {}  {:?}", col.name, col.kind);
            }
            if !r.preview.is_empty() {
                println!("Preview: {} row(s)", r.preview.len());
            }
        }
        Some(StepData::Validation(r)) => {
            if let Some(against) = &r.validated_against {
                println!("Validated against {}", against);
            }
            for w in &r.warnings {
                println!("warning: {}", w);
            }
            for b in &r.blocking {
                println!("blocking: {}", b);
            }
            if r.blocking.is_empty() && r.warnings.is_empty() {
                println!("Validation passed");
            }
        }
        None => {}
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_upload(
    api_base: Option<&str>,
    env: &str,
    bucket: &str,
    product: &str,
    table: &str,
    file: &Path,
    new_table: bool,
    describe_table: Option<&str>,
    describe_columns: &[String],
    yes: bool,
) -> Result<(), CliError> {
    if !file.exists() {
        return Err(CliError::usage(
            format!("File not found: {}", file.display()),
            None,
        ));
    }

    let client = make_client(api_base);
    let mut backend = client.clone();
    let mut wizard = IngestWizard::new();

    let ctx = IngestContext {
        env_id: env.to_string(),
        bucket_name: bucket.to_string(),
        product_name: product.to_string(),
        table_name: table.to_string(),
        file_path: file.to_path_buf(),
    };

    let token = wizard.open(ctx, new_table);
    wizard.resolve(&mut backend, token).map_err(wizard_error)?;
    print_step(&wizard, StepNumber::One);

    wizard.advance(&mut backend).map_err(wizard_error)?;
    println!();
    print_step(&wizard, StepNumber::Two);

    wizard.advance(&mut backend).map_err(wizard_error)?;
    println!();
    print_step(&wizard, StepNumber::Three);

    if new_table {
        if let Some(text) = describe_table {
            wizard.set_table_description(text).map_err(wizard_error)?;
        }
        for spec in describe_columns {
            let (col, text) = parse_column_description(spec)?;
            wizard
                .set_column_description(&col, &text)
                .map_err(wizard_error)?;
        }
    }

    if !wizard.can_confirm() {
        // Refuse before prompting; the server said no.
        return Err(wizard_error(WizardError::BlockedByValidation));
    }

    if !crate::confirm(&format!("Upload {} to {}/{}?", file.display(), product, table), yes)? {
        return Err(CliError::general("Aborted"));
    }

    let show_progress = atty::is(atty::Stream::Stderr);
    let result = wizard.confirm(&mut backend, &mut |pct| {
        if show_progress {
            eprint!("\rUploading... {}%", pct);
        }
    });
    if show_progress {
        eprintln!();
    }

    match result {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(e) => {
            // Best-effort breadcrumb for the operators' log stream.
            let _ = client.log_event(
                "error",
                "upload failed",
                serde_json::json!({
                    "product": product,
                    "table": table,
                    "env": env,
                }),
            );
            Err(wizard_error(e))
        }
    }
}

pub fn cmd_pipeline(
    api_base: Option<&str>,
    product: &str,
    project: Option<&str>,
) -> Result<(), CliError> {
    let client = make_client(api_base);
    let message = client.run_pipeline(product, project).map_err(api_error)?;
    println!("{}", message);
    Ok(())
}
