//! Runs one CLI command against the session stored in the data directory.

use crate::cli::Command;
use crate::error::{ErrorKind, Result};
use crate::session::Session;
use exn::ResultExt;
use orderly_cache::CacheStore;
use orderly_config::Config;
use orderly_rename::RuleParameters;
use orderly_storage::BackendHandle;
use orderly_storage::backend::{LocalBackend, ReadOnlyBackend};
use orderly_upload::{Dispatcher, GroupStatus, ItemOutcome};
use std::io::Write;
use std::sync::Arc;
use tracing::instrument;

/// Open the cache under `config.data_dir`. A dry run sees the stored state
/// but never writes back.
fn open_backend(config: &Config, dry_run: bool) -> Result<BackendHandle> {
    let local: BackendHandle =
        Arc::new(LocalBackend::new("cache", &config.data_dir).or_raise(|| ErrorKind::Storage)?);
    if dry_run {
        return Ok(Arc::new(ReadOnlyBackend::new(local)));
    }
    Ok(local)
}

#[instrument(skip_all, fields(dry_run = dry_run))]
pub async fn run(command: Command, config: &Config, dry_run: bool, out: &mut impl Write) -> Result<()> {
    let mut session = Session::open(CacheStore::new(open_backend(config, dry_run)?)).await?;
    match command {
        Command::Add { files } => {
            for path in &files {
                let id = session.add_file(path).await?;
                writeln!(out, "added {} as {id}", path.display()).or_raise(|| ErrorKind::Output)?;
            }
            session.save().await?;
        },
        Command::List => list(&session, out)?,
        Command::Move { from, to } => {
            session.move_item(from as usize - 1, to as usize - 1)?;
            session.save().await?;
            list(&session, out)?;
        },
        Command::Remove { id } => {
            let item = session.remove(&id)?;
            session.save().await?;
            writeln!(out, "removed {} ({})", item.id, item.name()).or_raise(|| ErrorKind::Output)?;
        },
        Command::Rename { mode, prefix, suffix, sequence, ids } => {
            let parameters = RuleParameters::new(mode)
                .with_prefix(prefix.unwrap_or_else(|| config.default_prefix.clone()))
                .with_suffix(suffix)
                .with_sequence(sequence);
            let key = session.rename(&ids, parameters)?;
            session.save().await?;
            let group = session.group(key.as_str())?;
            writeln!(out, "{key}").or_raise(|| ErrorKind::Output)?;
            for derived in &group.items {
                writeln!(out, "  {} <- {}", derived.derived_name, derived.source_id).or_raise(|| ErrorKind::Output)?;
            }
        },
        Command::Upload { group, service } => upload(&session, config, &group, &service, dry_run, out).await?,
        Command::Clear { derived } => {
            let (count, what) = match derived {
                true => (session.clear_derived(), "derived items"),
                false => (session.clear_items(), "items"),
            };
            session.save().await?;
            writeln!(out, "cleared {count} {what}").or_raise(|| ErrorKind::Output)?;
        },
    }
    if dry_run {
        tracing::info!("Dry run: nothing was written");
    }
    Ok(())
}

fn list(session: &Session, out: &mut impl Write) -> Result<()> {
    let items = session.board().items();
    writeln!(out, "board: {} item(s), {} derived", items.len(), session.derived().len())
        .or_raise(|| ErrorKind::Output)?;
    for (position, item) in items.iter().enumerate() {
        let stale = if item.is_stale() { "  [content missing]" } else { "" };
        writeln!(
            out,
            "  {:>3}. {:<6} {}  {} B  {}{stale}",
            position + 1,
            item.id,
            item.name(),
            item.size_bytes,
            item.mime_type,
        )
        .or_raise(|| ErrorKind::Output)?;
    }
    for group in session.groups() {
        let mode = group.items.first().map(|d| d.mode().as_str()).unwrap_or_default();
        writeln!(out, "group {} ({mode}, {} item(s))", group.key, group.items.len()).or_raise(|| ErrorKind::Output)?;
        for derived in &group.items {
            writeln!(out, "  {} <- {}", derived.derived_name, derived.source_id).or_raise(|| ErrorKind::Output)?;
        }
    }
    Ok(())
}

async fn upload(
    session: &Session,
    config: &Config,
    group: &str,
    service: &str,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    if dry_run {
        let group = session.group(group)?;
        writeln!(out, "would upload {} item(s) of {} to {service}", group.items.len(), group.key)
            .or_raise(|| ErrorKind::Output)?;
        for derived in &group.items {
            writeln!(out, "  {}", derived.derived_name).or_raise(|| ErrorKind::Output)?;
        }
        return Ok(());
    }

    let dispatcher = Dispatcher::from_services(&config.services, config.upload_concurrency).await;
    let report = session.upload(group, service, &dispatcher).await?;
    for (name, outcome) in &report.outcomes {
        match outcome {
            ItemOutcome::Uploaded { url } => writeln!(out, "  ok    {name}  {url}"),
            ItemOutcome::Failed { message } => writeln!(out, "  fail  {name}  {message}"),
        }
        .or_raise(|| ErrorKind::Output)?;
    }
    writeln!(out, "{}: {}", report.group_key, report.status).or_raise(|| ErrorKind::Output)?;
    if report.status != GroupStatus::Success {
        exn::bail!(ErrorKind::UploadIncomplete(report.group_key.to_string(), report.status.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderly_rename::RuleMode;
    use orderly_upload::{CustomService, ServiceKind};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        config: Config,
    }
    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config { data_dir: dir.path().join("data"), ..Config::default() };
            config.services.insert(
                "shop".to_string(),
                ServiceKind::Custom(CustomService {
                    root: dir.path().join("published"),
                    public_url: "https://img.example.com".to_string(),
                    prefix: None,
                }),
            );
            Self { dir, config }
        }

        fn image(&self, name: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, format!("pixels of {name}")).unwrap();
            path
        }

        async fn run(&self, command: Command, dry_run: bool) -> Result<String> {
            let mut out = Vec::new();
            run(command, &self.config, dry_run, &mut out).await?;
            Ok(String::from_utf8(out).unwrap())
        }

        fn published(&self, name: &str) -> Option<String> {
            std::fs::read_to_string(self.dir.path().join("published").join(name)).ok()
        }
    }

    fn rename(mode: RuleMode, prefix: &str, ids: &[&str]) -> Command {
        Command::Rename {
            mode,
            prefix: Some(prefix.to_string()),
            suffix: String::new(),
            sequence: String::new(),
            ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    fn group_key(output: &str) -> String {
        output.lines().next().unwrap().trim().to_string()
    }

    #[tokio::test]
    async fn test_add_rename_upload() {
        let fixture = Fixture::new();
        let files = vec![fixture.image("a.jpg"), fixture.image("b.jpg"), fixture.image("c.jpg")];
        let output = fixture.run(Command::Add { files }, false).await.unwrap();
        assert_eq!(output.lines().count(), 3);

        fixture.run(Command::Move { from: 3, to: 1 }, false).await.unwrap();
        let output = fixture.run(rename(RuleMode::Amazon, "SKU", &["2", "3", "1"]), false).await.unwrap();
        assert!(output.contains("SKU.MAIN.jpg <- 2"));
        assert!(output.contains("SKU.SWITCH.jpg <- 1"));
        let key = group_key(&output);

        let listing = fixture.run(Command::List, false).await.unwrap();
        assert!(listing.starts_with("board: 3 item(s)"));
        assert!(listing.contains(&format!("group {key} (amazon, 3 item(s))")));

        let output = fixture
            .run(Command::Upload { group: key.clone(), service: "shop".to_string() }, false)
            .await
            .unwrap();
        assert!(output.contains("https://img.example.com/SKU.PT01.jpg"));
        assert!(output.ends_with(&format!("{key}: success\n")));
        assert_eq!(fixture.published("SKU.MAIN.jpg").as_deref(), Some("pixels of b.jpg"));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let fixture = Fixture::new();
        let files = vec![fixture.image("a.png")];
        fixture.run(Command::Add { files: files.clone() }, true).await.unwrap();
        let listing = fixture.run(Command::List, false).await.unwrap();
        assert!(listing.starts_with("board: 0 item(s)"));

        fixture.run(Command::Add { files }, false).await.unwrap();
        let output = fixture.run(rename(RuleMode::PrefixIndex, "P", &["1"]), false).await.unwrap();
        let key = group_key(&output);
        let output = fixture.run(Command::Upload { group: key, service: "shop".to_string() }, true).await.unwrap();
        assert!(output.starts_with("would upload 1 item(s)"));
        assert!(fixture.published("P01.png").is_none());

        fixture.run(Command::Clear { derived: true }, true).await.unwrap();
        let listing = fixture.run(Command::List, false).await.unwrap();
        assert!(listing.contains("P01.png <- 1"));
    }

    #[tokio::test]
    async fn test_upload_to_unknown_service_fails() {
        let fixture = Fixture::new();
        fixture.run(Command::Add { files: vec![fixture.image("a.gif")] }, false).await.unwrap();
        let output = fixture.run(rename(RuleMode::PrefixIndex, "G", &["1"]), false).await.unwrap();
        let err = fixture
            .run(Command::Upload { group: group_key(&output), service: "nowhere".to_string() }, false)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::UploadIncomplete(_, status) if status == "error"));
    }

    #[tokio::test]
    async fn test_rename_uses_default_prefix() {
        let mut fixture = Fixture::new();
        fixture.config.default_prefix = "DEF".to_string();
        fixture.run(Command::Add { files: vec![fixture.image("a.jpg")] }, false).await.unwrap();
        let command = Command::Rename {
            mode: RuleMode::PrefixIndex,
            prefix: None,
            suffix: "-x".to_string(),
            sequence: String::new(),
            ids: vec!["1".to_string()],
        };
        let output = fixture.run(command, false).await.unwrap();
        assert!(output.contains("DEF01-x.jpg <- 1"));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let fixture = Fixture::new();
        let files = vec![fixture.image("a.jpg"), fixture.image("b.jpg")];
        fixture.run(Command::Add { files }, false).await.unwrap();
        let output = fixture.run(Command::Remove { id: "1".to_string() }, false).await.unwrap();
        assert_eq!(output, "removed 1 (a.jpg)\n");
        let err = fixture.run(Command::Remove { id: "1".to_string() }, false).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Board));
        let output = fixture.run(Command::Clear { derived: false }, false).await.unwrap();
        assert_eq!(output, "cleared 1 items\n");
    }

    #[tokio::test]
    async fn test_add_rejects_missing_and_non_image_files() {
        let fixture = Fixture::new();
        let err = fixture.run(Command::Add { files: vec![fixture.image("notes.txt")] }, false).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Import(..)));
        let missing = Path::new("/nonexistent/a.jpg").to_path_buf();
        let err = fixture.run(Command::Add { files: vec![missing] }, false).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Import(..)));
    }

    #[tokio::test]
    async fn test_move_out_of_range() {
        let fixture = Fixture::new();
        fixture.run(Command::Add { files: vec![fixture.image("a.jpg")] }, false).await.unwrap();
        let err = fixture.run(Command::Move { from: 1, to: 5 }, false).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Board));
    }
}
