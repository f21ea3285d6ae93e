use std::path::Path;

use tracing::info;

/// Where the generated workflow lives inside the repository
pub const WORKFLOW_PATH: &str = ".github/workflows/postman-tests.yml";

/// JUnit report written by Newman and uploaded as the run artifact
pub const RESULTS_PATH: &str = "./newman/results.xml";

/// GitHub Actions pipeline that runs a Postman collection with Newman.
///
/// The steps are fixed: checkout, Node.js, Newman, run the collection,
/// upload the JUnit results. Only the collection (and optional environment)
/// path varies.
pub struct WorkflowTemplate<'a> {
    collection_path: &'a str,
    environment_path: Option<&'a str>,
}

impl<'a> WorkflowTemplate<'a> {
    pub fn new(collection_path: &'a str) -> Self {
        Self {
            collection_path,
            environment_path: None,
        }
    }

    pub fn with_environment(mut self, environment_path: Option<&'a str>) -> Self {
        self.environment_path = environment_path;
        self
    }

    /// The Newman invocation of the run step
    pub fn run_command(&self) -> String {
        match self.environment_path {
            Some(env) => format!("newman run {} -e {}", self.collection_path, env),
            None => format!("newman run {}", self.collection_path),
        }
    }

    pub fn render(&self) -> String {
        format!(
            r#"name: Run Postman Collection

on:
  push:
    branches:
      - main
  pull_request:
    branches:
      - main

jobs:
  run-postman-collection:
    runs-on: ubuntu-latest

    steps:
      - name: Checkout repository
        uses: actions/checkout@v4

      - name: Install Node.js
        uses: actions/setup-node@v4
        with:
          node-version: '20'

      - name: Install Newman
        run: npm install -g newman

      - name: Run Postman collection
        run: |
          {run} \
            --reporters cli,junit \
            --reporter-junit-export {results}

      - name: Upload Test Results
        if: always()
        uses: actions/upload-artifact@v4
        with:
          name: postman-test-results
          path: {results}
"#,
            run = self.run_command(),
            results = RESULTS_PATH,
        )
    }

    /// Render and write to `output_path`, creating its parent directory
    pub fn generate(&self, output_path: &Path) -> std::io::Result<String> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.render();
        std::fs::write(output_path, &content)?;

        info!("GitHub Actions YAML file has been generated at {}", output_path.display());
        Ok(content)
    }
}
