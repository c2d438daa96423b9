//! End-to-end runs of the `kitsync` binary against a temporary home.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const CATALOG: &str = "CODIGO\tNOMBRE\np1\tCleanser\nP2\tSerum\n";

const SHEET: &str = "\
TIPO\tNOMBRE\tCODIGO\tCANTIDAD\tPRODUCTO\tTIPS\tPROTOCOLO\tIMAGEN
CASA\tHydra Kit\tP1\t1\tCleanser\t1. Drink water\t\thttps://img/hydra.png
\t\tP2\t2\tSerum\t\t
\t\t\t\t\t\tDÍA\t
\t\t\t\t\t\t\"1. Cleanse
2. Apply serum\"\t
CABINA\tPeel Session\tP1\t1\tCleanser\t\t\t
";

fn kitsync(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kitsync").expect("kitsync binary");
    cmd.env("KITSYNC_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn home_with_files() -> TempDir {
    let home = TempDir::new().expect("home");
    home.child("catalog.tsv").write_str(CATALOG).expect("catalog");
    home.child("kits.tsv").write_str(SHEET).expect("sheet");
    home
}

fn path(home: &TempDir, name: &str) -> String {
    home.child(name).path().display().to_string()
}

#[test]
fn init_is_idempotent() {
    let home = TempDir::new().expect("home");
    kitsync(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized kitsync"));
    home.child(".kitsync/config.yaml").assert(predicate::path::exists());
    home.child(".kitsync/kits.db").assert(predicate::path::exists());

    kitsync(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));
}

#[test]
fn extract_json_reports_records_without_store() {
    let home = home_with_files();
    kitsync(&home)
        .args(["extract", &path(&home, "kits.tsv"), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Hydra Kit\""))
        .stdout(predicate::str::contains("\"dia\""))
        .stdout(predicate::str::contains("\"imageLink\": \"https://img/hydra.png\""))
        .stdout(predicate::str::contains("\"kind\": \"headerSkipped\""));
    home.child(".kitsync/kits.db").assert(predicate::path::missing());
}

#[test]
fn preview_then_sync_then_resync() {
    let home = home_with_files();
    let sheet = path(&home, "kits.tsv");

    kitsync(&home)
        .args(["catalog", "import", &path(&home, "catalog.tsv")])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 created"));

    kitsync(&home)
        .args(["preview", &sheet])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 to create, 0 to update, 0 to delete"));
    kitsync(&home)
        .args(["kits", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No kits stored."));

    kitsync(&home)
        .args(["sync", &sheet])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 created, 0 updated, 0 deleted, 0 failed"));

    kitsync(&home)
        .args(["sync", &sheet, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"applied\""))
        .stdout(predicate::str::contains("\"updated\": 2"))
        .stdout(predicate::str::contains("\"created\": 0"));

    kitsync(&home)
        .args(["kits", "show", "hydra kit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply serum"))
        .stdout(predicate::str::contains("P2"));

    kitsync(&home)
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalKits\": 2"))
        .stdout(predicate::str::contains("\"CABINA\": 1"));
}

#[test]
fn unknown_product_is_reported_per_kit() {
    let home = home_with_files();
    home.child("bad.tsv")
        .write_str("CASA\tGood Kit\tP1\t1\nCASA\tBad Kit\tZZZ\t1\n")
        .expect("sheet");
    kitsync(&home)
        .args(["catalog", "import", &path(&home, "catalog.tsv")])
        .assert()
        .success();

    kitsync(&home)
        .args(["sync", &path(&home, "bad.tsv")])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created"))
        .stdout(predicate::str::contains("Bad Kit: Product not found ZZZ"));

    kitsync(&home)
        .args(["kits", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Good Kit"))
        .stdout(predicate::str::contains("Bad Kit").not());
}

#[test]
fn sheet_without_kits_is_refused() {
    let home = home_with_files();
    home.child("empty.tsv").write_str("TIPO\tNOMBRE\n").expect("sheet");
    kitsync(&home)
        .args(["sync", &path(&home, "empty.tsv")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid kits found"));
}

#[test]
fn remove_kit_by_name() {
    let home = home_with_files();
    home.child("one.tsv").write_str("CASA\tSolo\n").expect("sheet");
    kitsync(&home)
        .args(["sync", &path(&home, "one.tsv")])
        .assert()
        .success();

    kitsync(&home)
        .args(["kits", "remove", "SOLO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed kit 'Solo'"));
    kitsync(&home)
        .args(["kits", "show", "Solo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no kit matches 'Solo'"));
}

#[test]
fn upsert_keeps_kits_missing_from_sheet() {
    let home = home_with_files();
    home.child("two.tsv").write_str("CASA\tA\nCASA\tB\n").expect("sheet");
    home.child("one.tsv").write_str("CASA\tA\n").expect("sheet");
    kitsync(&home)
        .args(["sync", &path(&home, "two.tsv")])
        .assert()
        .success();

    kitsync(&home)
        .args(["sync", &path(&home, "one.tsv"), "--upsert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 deleted"));
    kitsync(&home)
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalKits\": 2"));
}

#[test]
fn batch_sync_matches_per_kit_sync() {
    let home = home_with_files();
    home.child("one.tsv").write_str("CASA\tA\n").expect("sheet");
    kitsync(&home)
        .args(["catalog", "import", &path(&home, "catalog.tsv")])
        .assert()
        .success();

    kitsync(&home)
        .args(["sync", &path(&home, "kits.tsv"), "--batch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 created, 0 updated, 0 deleted, 0 failed)"));
    kitsync(&home)
        .args(["sync", &path(&home, "one.tsv"), "--batch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 created, 0 updated, 2 deleted, 0 failed)"));
}
