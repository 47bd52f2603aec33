// tests/session_test.rs
use pom_bump::module::{Artifact, ProjectModule};
use pom_bump::scenario::Scenario;
use pom_bump::session::{RunMode, Session};
use pom_bump::vcs::VersionControl;
use pom_bump::{BumpError, Result};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

/// Version control that records each hook call as a line of text
#[derive(Clone, Default)]
struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl VersionControl for CallLog {
    fn name(&self) -> &'static str {
        "log"
    }

    fn prepare_save(&mut self, module: &ProjectModule) -> Result<()> {
        self.record(format!("prepare {}", module.name()));
        Ok(())
    }

    fn commit(&mut self, module: &ProjectModule) -> Result<()> {
        self.record(format!(
            "commit {}: {}",
            module.name(),
            module.resolved_commit_message()
        ));
        Ok(())
    }

    fn label(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        let labels: Vec<String> = modules
            .iter()
            .filter_map(|m| m.label().map(|l| format!("{}={}", m.name(), l)))
            .collect();
        self.record(format!("label {}", labels.join(",")));
        Ok(())
    }

    fn restore(&mut self, modules: &[&ProjectModule]) -> Result<()> {
        for module in modules {
            self.record(format!("restore {}", module.name()));
        }
        Ok(())
    }
}

fn write_pom(base: &Path, dir: &str, content: &str) {
    let dir = base.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("pom.xml"), content).unwrap();
}

fn read_pom(base: &Path, dir: &str) -> String {
    fs::read_to_string(base.join(dir).join("pom.xml")).unwrap()
}

const ROOT: &str = r#"<project>
  <groupId>se.tla.shop</groupId>
  <artifactId>shop-parent</artifactId>
  <version>1.0-SNAPSHOT</version>
  <packaging>pom</packaging>
</project>
"#;

const CORE: &str = r#"<project>
  <parent>
    <groupId>se.tla.shop</groupId>
    <artifactId>shop-parent</artifactId>
    <version>1.0-SNAPSHOT</version>
  </parent>
  <artifactId>core</artifactId>
  <version>1.0-SNAPSHOT</version>
  <dependencies>
    <dependency>
      <groupId>org.apache.commons</groupId>
      <artifactId>commons-lang3</artifactId>
      <version>3.11</version>
    </dependency>
  </dependencies>
</project>
"#;

const WEB: &str = r#"<project>
  <parent>
    <groupId>se.tla.shop</groupId>
    <artifactId>shop-parent</artifactId>
    <version>1.0-SNAPSHOT</version>
  </parent>
  <artifactId>web</artifactId>
  <version>1.0-SNAPSHOT</version>
  <properties>
    <core.version>1.0-SNAPSHOT</core.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>se.tla.shop</groupId>
      <artifactId>core</artifactId>
      <version>${core.version}</version>
    </dependency>
  </dependencies>
</project>
"#;

fn shop() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_pom(dir.path(), "", ROOT);
    write_pom(dir.path(), "core", CORE);
    write_pom(dir.path(), "web", WEB);
    dir
}

/// `web` is declared before the modules it references
const RELEASE: &str = r#"
[[readonly]]
id = "lang"
group_id = "org.apache.commons"
artifact_id = "commons-lang3"
version = "3.12.0"

[[module]]
path = "web"
version = "1.0"
label = "SHOP_1_0"
parent = "root"
dependencies = ["core"]

[[module]]
path = "core"
version = "1.0"
label = "SHOP_1_0"
commit_message = "Release core"
parent = "root"
dependencies = ["lang"]

[[module]]
path = ""
id = "root"
version = "1.0"
"#;

fn release_session(base: &Path, log: &CallLog) -> Session {
    let mut session = Session::new(base).with_version_control(Box::new(log.clone()));
    Scenario::parse(RELEASE)
        .unwrap()
        .apply(&mut session)
        .unwrap();
    session
}

#[test]
fn test_release_scenario_rewrites_all_references() {
    let base = shop();
    let log = CallLog::default();
    let mut session = release_session(base.path(), &log);

    let summary = session.run(RunMode::Normal).unwrap();
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.committed, 3);
    assert_eq!(summary.labels, vec!["SHOP_1_0"]);

    let web = read_pom(base.path(), "web");
    assert!(web.contains("<core.version>1.0</core.version>"));
    assert!(web.contains("<version>${core.version}</version>"));
    assert!(web.contains("<artifactId>shop-parent</artifactId>\n    <version>1.0</version>"));

    let core = read_pom(base.path(), "core");
    assert!(core.contains("<version>3.12.0</version>"));
    assert!(core.contains("<artifactId>core</artifactId>\n  <version>1.0</version>"));

    let root = read_pom(base.path(), "");
    assert!(root.contains("<version>1.0</version>"));
}

#[test]
fn test_normal_run_prepares_commits_then_labels_once() {
    let base = shop();
    let log = CallLog::default();
    let mut session = release_session(base.path(), &log);
    session.run(RunMode::Normal).unwrap();

    assert_eq!(
        log.calls(),
        vec![
            "prepare web",
            "prepare core",
            "prepare ",
            "commit web: Bump 1.0-SNAPSHOT -> 1.0",
            "commit core: Release core",
            "commit : Bump 1.0-SNAPSHOT -> 1.0",
            "label web=SHOP_1_0,core=SHOP_1_0",
        ]
    );
}

#[test]
fn test_bumps_list_original_and_new_coordinates() {
    let base = shop();
    let session = release_session(base.path(), &CallLog::default());
    let bumps = session.bumps();

    assert_eq!(bumps.len(), 3);
    assert_eq!(bumps[0].module, "web");
    assert_eq!(bumps[0].original, "se.tla.shop:web:1.0-SNAPSHOT");
    assert_eq!(bumps[0].updated, "se.tla.shop:web:1.0");
    assert_eq!(bumps[0].label.as_deref(), Some("SHOP_1_0"));
    assert_eq!(bumps[2].module, "root");
    assert_eq!(bumps[2].label, None);
}

#[test]
fn test_prepare_test_build_writes_without_commit() {
    let base = shop();
    let log = CallLog::default();
    let mut session = release_session(base.path(), &log);

    let summary = session.run(RunMode::PrepareTest).unwrap();
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.committed, 0);
    assert!(log.calls().iter().all(|c| c.starts_with("prepare")));
    assert!(read_pom(base.path(), "core").contains("3.12.0"));
}

#[test]
fn test_dry_run_touches_nothing() {
    let base = shop();
    let log = CallLog::default();
    let mut session = release_session(base.path(), &log);

    session.run(RunMode::DryRun).unwrap();
    assert!(log.calls().is_empty());
    assert_eq!(read_pom(base.path(), "core"), CORE);
    assert_eq!(read_pom(base.path(), "web"), WEB);
}

#[test]
fn test_revert_restores_every_module() {
    let base = shop();
    let log = CallLog::default();
    let mut session = release_session(base.path(), &log);

    let summary = session.run(RunMode::Revert).unwrap();
    assert_eq!(summary.restored, 3);
    assert_eq!(log.calls(), vec!["restore web", "restore core", "restore "]);
}

#[test]
fn test_unknown_reference_fails_before_writing() {
    let base = shop();
    let mut session = Session::new(base.path());
    let scenario = Scenario::parse(
        r#"
[[module]]
path = "core"
version = "2.0"
dependencies = ["nowhere"]
"#,
    )
    .unwrap();

    let err = scenario.apply(&mut session).unwrap_err();
    assert!(matches!(err, BumpError::Scenario(_)));
    assert!(err.to_string().contains("nowhere"));
    assert_eq!(read_pom(base.path(), "core"), CORE);
}

#[test]
fn test_readonly_module_cannot_be_loaded_for_update() {
    let base = shop();
    let mut session = Session::new(base.path());
    let scenario = Scenario::parse(
        r#"
[[readonly]]
id = "lang"
group_id = "org.apache.commons"
artifact_id = "commons-lang3"
version = "3.12.0"

[[module]]
path = "core"
id = "lang"
"#,
    )
    .unwrap();

    assert!(matches!(
        scenario.apply(&mut session).unwrap_err(),
        BumpError::Scenario(_)
    ));
}

#[test]
fn test_session_updates_by_id() {
    let base = shop();
    let mut session = Session::new(base.path());
    session.load_as("root", "").unwrap().set_version("2.0").unwrap();
    session.load("core").unwrap();

    session.update_parent("core", "root").unwrap();
    let core = session.find("core").unwrap();
    assert_eq!(core.editable().unwrap().parent_version().as_deref(), Some("2.0"));
    assert_eq!(core.group_id().as_deref(), Some("se.tla.shop"));

    let err = session.update_dependency("core", "root").unwrap_err();
    assert!(err.is_argument());
}
