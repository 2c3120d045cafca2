//! Shared corpus files and providers for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Once;

use retrieval::MockEmbeddingProvider;
use retrieval::{Config, Corpus};

pub const DOCKER_URL: &str = "https://discourse.onlinedegree.iitm.ac.in/t/docker-basics/101";
pub const GIT_URL: &str = "https://discourse.onlinedegree.iitm.ac.in/t/git-rebase/202";
pub const COURSE_DOCKER_URL: &str = "https://tds.s-anand.net/#/docker";

pub const FORUM_SNAPSHOT: &str = r#"[
  {
    "question": "What is Docker?",
    "answer": "Docker is a containerization tool that packages an app with its dependencies.",
    "answered_by": "carlton",
    "url": "https://discourse.onlinedegree.iitm.ac.in/t/docker-basics/101"
  },
  {
    "question": "How do I undo a Git rebase?",
    "answer": "Use git reflog to find the previous HEAD and reset to it.",
    "answered_by": "s.anand",
    "url": "https://discourse.onlinedegree.iitm.ac.in/t/git-rebase/202"
  },
  {
    "question": "   ",
    "answer": "Dropped because the question is blank."
  }
]"#;

pub const COURSE_PAGES: &str = r#"[
  {
    "title": "Containers: Docker, Podman",
    "content": "Docker runs applications in isolated containers built from images.",
    "url": "https://tds.s-anand.net/../#/docker"
  },
  {
    "title": "Version Control: Git, GitHub",
    "content": "Git tracks changes to files over time.",
    "url": "https://tds.s-anand.net/../#/git"
  },
  {
    "title": "Placeholder page",
    "url": "https://tds.s-anand.net/../#/empty"
  }
]"#;

static TRACING: Once = Once::new();

/// Installs a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Config rooted at `data_dir` with default ranking.
pub fn test_config(data_dir: &Path) -> Config {
    Config {
        data_dir: data_dir.to_path_buf(),
        ..Config::default()
    }
}

/// Writes the forum snapshot where the forum source expects it.
pub fn write_forum_snapshot(config: &Config) -> PathBuf {
    let dir = config.corpus_dir(Corpus::Forum);
    std::fs::create_dir_all(&dir).expect("create forum dir");
    let path = dir.join(Corpus::Forum.records_file_name());
    std::fs::write(&path, FORUM_SNAPSHOT).expect("write forum snapshot");
    path
}

/// Writes raw course pages and returns `(raw_path, snapshot_path)`.
pub fn write_course_pages(config: &Config) -> (PathBuf, PathBuf) {
    let dir = config.corpus_dir(Corpus::Course);
    std::fs::create_dir_all(&dir).expect("create course dir");
    let raw = dir.join("tds_pages.json");
    std::fs::write(&raw, COURSE_PAGES).expect("write course pages");
    (raw, dir.join(Corpus::Course.records_file_name()))
}

/// Texts about Docker, Git and anything else land on three orthogonal axes.
pub fn topic_provider() -> MockEmbeddingProvider {
    MockEmbeddingProvider::with_fn(|text| {
        let lower = text.to_lowercase();
        if lower.contains("docker") {
            vec![1.0, 0.0, 0.0]
        } else if lower.contains("git") {
            vec![0.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, 1.0]
        }
    })
}
