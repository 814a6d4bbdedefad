mod harness;

use harness::TestContext;
use predicates::prelude::*;

#[test]
fn config_file_selects_root_and_template() {
    let ctx = TestContext::new();
    ctx.write_file(
        "wildslot.toml",
        "[store]\nroot = \"slots\"\n\n[resolver]\ntemplate_key = \"m/main\"\nseparator = \" | \"\n",
    );
    ctx.write_file("slots/colors.txt", "red\n");
    ctx.write_file("slots/m/main.txt", "- a {colors} cat\n");

    assert_eq!(ctx.stdout_of(&["list"]), "colors\nm/main\n");
    ctx.cli().arg("generate").assert().success().stdout("a red cat\n");
    ctx.cli().args(["resolve", "{colors}", "{colors}"]).assert().success().stdout("red | red\n");
    assert!(ctx.work_dir().join("slots/last_generated.json").exists());
}

#[test]
fn root_flag_beats_environment_and_config() {
    let ctx = TestContext::new();
    ctx.write_file("wildslot.toml", "[store]\nroot = \"from-config\"\n");
    ctx.write_file("from-config/a.txt", "x\n");
    ctx.write_file("from-env/b.txt", "x\n");
    ctx.write_file("from-flag/c.txt", "x\n");

    assert_eq!(ctx.stdout_of(&["list"]), "a\n");

    let mut cmd = ctx.cli();
    cmd.env("WILDSLOT_ROOT", "from-env").arg("list").assert().success().stdout("b\n");

    let mut cmd = ctx.cli();
    cmd.env("WILDSLOT_ROOT", "from-env")
        .args(["--root", "from-flag", "list"])
        .assert()
        .success()
        .stdout("c\n");
}

#[test]
fn invalid_config_is_reported() {
    let ctx = TestContext::new();
    ctx.write_file("wildslot.toml", "[resolver]\nmax_depth = 0\n");

    ctx.cli()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let ctx = TestContext::new();
    ctx.write_file("wildslot.toml", "[store]\nmanaged_prefix = \"m/\"\n");

    ctx.cli().arg("list").assert().failure().stderr(predicate::str::contains("Error:"));
}

#[test]
fn explicit_config_must_exist() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["--config", "missing.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn recursion_limit_fails_the_command() {
    let ctx = TestContext::new();
    ctx.write_file("wildslot.toml", "[resolver]\nmax_depth = 3\n");
    ctx.put("loop", &["again {loop}"]);

    ctx.cli()
        .args(["resolve", "{loop}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Recursion limit"));
}

#[test]
fn pin_last_repeats_previous_draws() {
    let ctx = TestContext::new();
    ctx.put("m/color", &["red", "blue", "green", "black", "white"]);
    ctx.put("m/template", &["{m/color} hat"]);

    let first = ctx.stdout_of(&["generate", "--seed", "1"]);
    for seed in ["2", "3", "4"] {
        assert_eq!(ctx.stdout_of(&["generate", "--pin-last", "--seed", seed]), first);
    }
}

#[test]
fn conditions_follow_earlier_choices() {
    let ctx = TestContext::new();
    ctx.put("season", &["winter"]);
    ctx.put("clothes", &["season=winter => coat", "season=summer => shorts"]);

    ctx.cli()
        .args(["resolve", "{season}: {clothes}"])
        .assert()
        .success()
        .stdout("winter: coat\n");
}

#[test]
fn edits_survive_between_invocations() {
    let ctx = TestContext::new();
    ctx.write_file("colors.txt", "red\nblue\n");

    ctx.cli().args(["move", "colors", "--group", "palette"]).assert().success();
    assert!(!ctx.work_dir().join("colors.txt").exists());
    assert_eq!(ctx.stdout_of(&["list"]), "palette/colors\n");
    assert_eq!(ctx.stdout_of(&["show", "palette/colors"]), "- red\n- blue\n");
}
