//! Integration tests for CLI commands

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const VALUES: &str = r#"
image:
  registry: docker.io
  repository: bitnami/redis
  tag: "7.2.4"
metrics:
  enabled: false
  image:
    registry: docker.io
    repository: bitnami/redis-exporter
    tag: "1.58.0"
sidecar:
  image: quay.io/prometheus/busybox:latest
"#;

const MANIFEST: &str = r#"---
# Source: redis/templates/master.yaml
apiVersion: apps/v1
kind: StatefulSet
metadata:
  name: cache-redis-master
spec:
  template:
    spec:
      containers:
        - name: redis
          image: docker.io/bitnami/redis:7.2.4
---
# Source: redis/templates/replicas.yaml
apiVersion: apps/v1
kind: StatefulSet
metadata:
  name: cache-redis-replicas
spec:
  template:
    spec:
      containers:
        - name: redis
          image: docker.io/bitnami/redis:7.2.4
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let chart = dir.path().join("redis");
        fs::create_dir(&chart).unwrap();
        fs::write(
            chart.join("Chart.yaml"),
            "apiVersion: v2\nname: redis\nversion: 1.0.0\n",
        )
        .unwrap();
        fs::write(chart.join("values.yaml"), VALUES).unwrap();
        fs::write(dir.path().join("manifest.yaml"), MANIFEST).unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "render:\n  helm: /nonexistent/chartmirror-helm\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn chart(&self) -> PathBuf {
        self.path("redis")
    }

    fn run(&self, args: &[&str]) -> std::process::Output {
        Command::new(env!("CARGO_BIN_EXE_chartmirror"))
            .arg("--config")
            .arg(self.path("config.yaml"))
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute chartmirror")
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn json_output(output: &std::process::Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output should be valid JSON")
}

mod images_command {
    use super::*;

    #[test]
    fn test_values_strategy() {
        let fixture = Fixture::new();
        let chart = fixture.chart();

        let output = fixture.run(&["images", arg(&chart), "--strategy", "values", "--json"]);
        let json = json_output(&output);

        assert_eq!(json["strategy"], "values");
        let images = json["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["reference"], "docker.io/bitnami/redis:7.2.4");
        assert_eq!(images[0]["paths"][0], "image.registry");
        assert_eq!(images[1]["repository"], "quay.io/prometheus/busybox:latest");
        assert_eq!(images[1]["paths"][0], "sidecar.image");
    }

    #[test]
    fn test_set_enables_disabled_branch() {
        let fixture = Fixture::new();
        let chart = fixture.chart();

        let output = fixture.run(&[
            "images",
            arg(&chart),
            "--strategy",
            "values",
            "--set",
            "metrics.enabled=true",
            "--set",
            "image.tag=7.4.0",
            "--json",
        ]);
        let json = json_output(&output);

        let references: Vec<&str> = json["images"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["reference"].as_str().unwrap())
            .collect();
        assert!(references.contains(&"docker.io/bitnami/redis:7.4.0"));
        assert!(references.contains(&"docker.io/bitnami/redis-exporter:1.58.0"));
    }

    #[test]
    fn test_manifest_strategy_collapses_duplicates() {
        let fixture = Fixture::new();
        let chart = fixture.chart();
        let manifest = fixture.path("manifest.yaml");

        let output = fixture.run(&[
            "images",
            arg(&chart),
            "--manifest",
            arg(&manifest),
            "--json",
        ]);
        let json = json_output(&output);

        assert_eq!(json["strategy"], "manifest");
        let images = json["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["registry"], "docker.io");
        assert_eq!(images[0]["repository"], "bitnami/redis");
        assert_eq!(images[0]["tag"], "7.2.4");
        assert_eq!(
            images[0]["paths"],
            serde_json::json!([
                "StatefulSet/cache-redis-master/image=docker.io/bitnami/redis:7.2.4",
                "StatefulSet/cache-redis-replicas/image=docker.io/bitnami/redis:7.2.4"
            ])
        );
    }

    #[test]
    fn test_missing_helm_falls_back_to_values() {
        let fixture = Fixture::new();
        let chart = fixture.chart();

        let output = fixture.run(&["images", arg(&chart), "--json"]);
        let json = json_output(&output);

        assert_eq!(json["strategy"], "values");
        assert!(json["renderError"].as_str().unwrap().contains("chartmirror-helm"));
    }

    #[test]
    fn test_manifest_only_fails_without_helm() {
        let fixture = Fixture::new();
        let chart = fixture.chart();

        let output = fixture.run(&["images", arg(&chart), "--strategy", "manifest"]);

        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn test_missing_chart() {
        let fixture = Fixture::new();
        let missing = fixture.path("nope");

        let output = fixture.run(&["images", arg(&missing)]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Chart directory not found"));
    }

    #[test]
    fn test_human_output() {
        let fixture = Fixture::new();
        let chart = fixture.chart();

        let output = fixture.run(&["images", arg(&chart), "--strategy", "values"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("docker.io/bitnami/redis:7.2.4"));
        assert!(stdout.contains("image.repository"));
        assert!(stdout.contains("2 image(s)"));
    }
}

mod rewrite_command {
    use super::*;

    #[test]
    fn test_rewrite_to_stdout() {
        let fixture = Fixture::new();
        let values = fixture.chart().join("values.yaml");

        let output = fixture.run(&[
            "rewrite",
            arg(&values),
            "--registry",
            "oci://mirror.example.com",
            "--prefix-source",
        ]);

        assert!(output.status.success());
        let yaml: serde_json::Value = serde_yaml::from_slice(&output.stdout).unwrap();
        assert_eq!(yaml["image"]["registry"], "mirror.example.com");
        assert_eq!(yaml["image"]["repository"], "docker/bitnami/redis");
        assert_eq!(
            yaml["sidecar"]["image"],
            "mirror.example.com/quay/prometheus/busybox:latest"
        );
    }

    #[test]
    fn test_rewrite_to_file_is_stable() {
        let fixture = Fixture::new();
        let values = fixture.chart().join("values.yaml");
        let first = fixture.path("first.yaml");
        let second = fixture.path("second.yaml");

        let output = fixture.run(&[
            "rewrite",
            arg(&values),
            "-r",
            "mirror.example.com",
            "--prefix-source",
            "-o",
            arg(&first),
        ]);
        assert!(output.status.success());

        let output = fixture.run(&[
            "rewrite",
            arg(&first),
            "-r",
            "mirror.example.com",
            "--prefix-source",
            "-o",
            arg(&second),
        ]);
        assert!(output.status.success());

        assert_eq!(
            fs::read_to_string(&first).unwrap(),
            fs::read_to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_rewrite_keeps_key_order() {
        let fixture = Fixture::new();
        let values = fixture.path("unsorted.yaml");
        fs::write(
            &values,
            "zookeeper:\n  image: zookeeper:3.9\nreplicaCount: 1\napp:\n  tag: \"1\"\n  registry: docker.io\n  repository: acme/app\n",
        )
        .unwrap();

        let output = fixture.run(&["rewrite", arg(&values), "-r", "mirror.example.com"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let keys: Vec<&str> = stdout
            .lines()
            .filter_map(|line| line.split(':').next())
            .map(str::trim)
            .collect();
        assert_eq!(
            keys,
            vec!["zookeeper", "image", "replicaCount", "app", "tag", "registry", "repository"]
        );

        let yaml: serde_json::Value = serde_yaml::from_str(&stdout).unwrap();
        assert_eq!(
            yaml["zookeeper"]["image"],
            "mirror.example.com/library/zookeeper:3.9"
        );
        assert_eq!(yaml["app"]["registry"], "mirror.example.com");
    }

    #[test]
    fn test_no_prefix_source_overrides_config() {
        let fixture = Fixture::new();
        fs::write(
            fixture.path("config.yaml"),
            "registry: mirror.example.com\nprefixSource: true\n",
        )
        .unwrap();
        let values = fixture.chart().join("values.yaml");

        let prefixed = fixture.run(&["rewrite", arg(&values)]);
        let plain = fixture.run(&["rewrite", arg(&values), "--no-prefix-source"]);

        assert!(prefixed.status.success());
        assert!(plain.status.success());
        let prefixed: serde_json::Value = serde_yaml::from_slice(&prefixed.stdout).unwrap();
        let plain: serde_json::Value = serde_yaml::from_slice(&plain.stdout).unwrap();
        assert_eq!(prefixed["image"]["repository"], "docker/bitnami/redis");
        assert_eq!(plain["image"]["repository"], "bitnami/redis");
        assert_eq!(plain["image"]["registry"], "mirror.example.com");
    }

    #[test]
    fn test_rewrite_requires_registry() {
        let fixture = Fixture::new();
        let values = fixture.chart().join("values.yaml");

        let output = fixture.run(&["rewrite", arg(&values)]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("No destination registry"));
    }
}
