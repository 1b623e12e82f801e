use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::NamedTempFile;

const CATALOG: &str = include_str!("../testdata/catalog.json");

fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    file
}

fn cmd(catalog: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("actionset").unwrap();
    cmd.arg("--catalog").arg(catalog.path());
    cmd
}

#[test]
fn test_expands_pattern_argument() {
    let catalog = catalog_file();
    cmd(&catalog)
        .arg("s3:Get*")
        .assert()
        .success()
        .stdout("S3:GetBucket\nS3:GetObject\n")
        .stderr("");
}

#[test]
fn test_expands_multiple_pattern_arguments() {
    let catalog = catalog_file();
    cmd(&catalog)
        .args(["s3:Get*", "ec2:Describe*"])
        .assert()
        .success()
        .stdout("EC2:DescribeInstances\nEC2:DescribeVolumes\nS3:GetBucket\nS3:GetObject\n");
}

#[test]
fn test_no_matches_is_still_success() {
    let catalog = catalog_file();
    cmd(&catalog)
        .arg("s3:NonExistent*")
        .assert()
        .success()
        .stdout("")
        .stderr("");
}

#[test]
fn test_invert_star_prints_nothing() {
    let catalog = catalog_file();
    cmd(&catalog)
        .args(["--invert", "*"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_invert_pattern() {
    let catalog = catalog_file();
    cmd(&catalog)
        .args(["-i", "s3:*"])
        .assert()
        .success()
        .stdout(
            "EC2:DescribeInstances\nEC2:DescribeVolumes\nIAM:CreateAccessKey\n\
             IAM:ListAccessKeys\nIAM:PassRole\nSTS:AssumeRole\n",
        );
}

#[test]
fn test_invalid_pattern_exits_one() {
    let catalog = catalog_file();
    cmd(&catalog)
        .arg("s3")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("invalid action pattern 's3'"));
}

#[test]
fn test_invalid_handling_keep_prints_the_literal() {
    let catalog = catalog_file();
    cmd(&catalog)
        .args(["--invalid-handling", "keep", "nonexistent:*"])
        .assert()
        .success()
        .stdout("nonexistent:*\n");
}

#[test]
fn test_invalid_handling_remove_drops_the_pattern() {
    let catalog = catalog_file();
    cmd(&catalog)
        .args(["--invalid-handling", "remove", "nonexistent:*", "s3:Get*"])
        .assert()
        .success()
        .stdout("S3:GetBucket\nS3:GetObject\n");
}

#[test]
fn test_reads_patterns_from_stdin() {
    let catalog = catalog_file();
    cmd(&catalog)
        .write_stdin("s3:Get*\n\nec2:Describe*\n")
        .assert()
        .success()
        .stdout("EC2:DescribeInstances\nEC2:DescribeVolumes\nS3:GetBucket\nS3:GetObject\n");
}

#[test]
fn test_rewrites_policy_from_stdin() {
    let policy = json!({
        "Version": "2012-10-17",
        "Statement": [
            {"Effect": "Allow", "Action": "s3:Get*", "Resource": "*"},
            {
                "Effect": "Deny",
                "NotAction": ["ec2:Describe*", "iam:*AccessKey*"],
                "Resource": "*"
            }
        ]
    });

    let catalog = catalog_file();
    let output = cmd(&catalog)
        .write_stdin(policy.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rewritten: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        rewritten["Statement"][0]["Action"],
        json!(["S3:GetBucket", "S3:GetObject"])
    );
    assert_eq!(
        rewritten["Statement"][1]["NotAction"],
        json!([
            "EC2:DescribeInstances",
            "EC2:DescribeVolumes",
            "IAM:CreateAccessKey",
            "IAM:ListAccessKeys"
        ])
    );
    assert_eq!(rewritten["Version"], "2012-10-17");
}

#[test]
fn test_invert_is_rejected_for_policy_input() {
    let catalog = catalog_file();
    cmd(&catalog)
        .arg("--invert")
        .write_stdin(r#"{"Statement": []}"#)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "--invert cannot be used when processing a JSON policy",
        ));
}

#[test]
fn test_malformed_json_policy_exits_one() {
    let catalog = catalog_file();
    cmd(&catalog)
        .write_stdin("{invalid json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON policy"));
}

#[test]
fn test_policy_shape_error_exits_one() {
    let catalog = catalog_file();
    cmd(&catalog)
        .write_stdin(r#"{"Statement": "invalid"}"#)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'Statement' value must be a list"));
}

#[test]
fn test_missing_catalog_exits_one_with_usage() {
    Command::cargo_bin("actionset")
        .unwrap()
        .env_remove("ACTIONSET_CATALOG")
        .arg("s3:Get*")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no catalog given"));
}

#[test]
fn test_unreadable_catalog_is_an_unexpected_error() {
    Command::cargo_bin("actionset")
        .unwrap()
        .args(["--catalog", "/definitely/not/here.json", "s3:Get*"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("An unexpected error occurred"));
}

#[test]
fn test_catalog_from_environment() {
    let catalog = catalog_file();
    Command::cargo_bin("actionset")
        .unwrap()
        .env("ACTIONSET_CATALOG", catalog.path())
        .arg("sts:*")
        .assert()
        .success()
        .stdout("STS:AssumeRole\n");
}
