use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use super::client::{
    CreateTaskOptions, TaskClient, TaskStatus, TaskVars, TemplateOptions, TopicHandler,
    UpdateTaskOptions,
};
use super::config::{list_files, LoadConfig};
use super::LoadError;
use crate::analyzer::TaskType;
use crate::ast::Program;
use crate::parser::parse;

const SCRIPT_EXTENSIONS: [&str; 1] = ["tick"];
const DATA_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Task,
    Template,
    TopicHandler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
}

/// One resource pushed to the task-management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub resource: Resource,
    pub id: String,
    pub action: Action,
}

impl fmt::Display for Loaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Created => "created",
            Action::Updated => "updated",
        };
        let resource = match self.resource {
            Resource::Task => "task",
            Resource::Template => "template",
            Resource::TopicHandler => "handler",
        };
        write!(f, "{action} {resource} {}", self.id)
    }
}

/// Outcome of [`LoadService::load`]. A file that failed does not stop the
/// files after it.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<Loaded>,
    pub failed: Vec<(PathBuf, LoadError)>,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, path: &Path, result: Result<Loaded, LoadError>) {
        match result {
            Ok(loaded) => {
                info!(path = %path.display(), "{loaded}");
                self.loaded.push(loaded);
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load file");
                self.failed.push((path.to_path_buf(), err));
            }
        }
    }
}

/// Pushes the contents of a load directory through a [`TaskClient`].
pub struct LoadService<C> {
    config: LoadConfig,
    client: C,
}

fn file_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_file(path: &Path, script: &str) -> Result<Program, LoadError> {
    parse(script).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes a JSON or YAML document, chosen by file extension.
fn decode<T: DeserializeOwned>(path: &Path, data: &str) -> Result<T, LoadError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(data).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Some("yaml" | "yml") => serde_yaml::from_str(data).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(LoadError::UnsupportedExtension(path.to_path_buf())),
    }
}

impl<C: TaskClient> LoadService<C> {
    pub fn new(config: LoadConfig, client: C) -> Self {
        LoadService { config, client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// `.tick` files in the tasks directory.
    pub fn task_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        list_files(&self.config.tasks_dir(), &SCRIPT_EXTENSIONS)
    }

    /// `.tick` templates and their task var files. The templates directory
    /// is optional.
    pub fn template_files(&self) -> Result<(Vec<PathBuf>, Vec<PathBuf>), LoadError> {
        let dir = self.config.templates_dir();
        if !dir.is_dir() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((
            list_files(&dir, &SCRIPT_EXTENSIONS)?,
            list_files(&dir, &DATA_EXTENSIONS)?,
        ))
    }

    pub fn handler_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        list_files(&self.config.handlers_dir(), &DATA_EXTENSIONS)
    }

    /// Loads tasks, then templates and their vars, then handlers.
    pub fn load(&mut self) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();

        for path in self.task_files()? {
            let result = self.load_tickscript(&path);
            report.record(&path, result);
        }

        let (templates, vars) = self.template_files()?;
        let mut parsed = HashMap::new();
        for path in templates {
            let result = self.load_template(&path, &mut parsed);
            report.record(&path, result);
        }
        for path in vars {
            let result = self.load_vars(&path, &parsed);
            report.record(&path, result);
        }

        for path in self.handler_files()? {
            let result = self.load_handler(&path);
            report.record(&path, result);
        }

        debug!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "load finished"
        );
        Ok(report)
    }

    /// Disables then enables a task so the running pipeline picks up changes.
    fn reload_task(&mut self, id: &str) -> Result<(), LoadError> {
        self.client
            .update_task(id, UpdateTaskOptions::status(TaskStatus::Disabled))?;
        self.client
            .update_task(id, UpdateTaskOptions::status(TaskStatus::Enabled))?;
        Ok(())
    }

    fn load_tickscript(&mut self, path: &Path) -> Result<Loaded, LoadError> {
        let script = read_file(path)?;
        let id = file_id(path);
        let program = parse_file(path, &script)?;

        let task_type = program.task_type();
        if task_type == TaskType::Invalid {
            return Err(LoadError::InvalidTaskType { id });
        }

        let action = if self.client.task(&id)?.is_none() {
            self.client.create_task(CreateTaskOptions {
                id: id.clone(),
                template_id: None,
                task_type: Some(task_type),
                dbrps: program.dbrps(),
                tickscript: Some(script),
                status: TaskStatus::Enabled,
                vars: Default::default(),
            })?;
            Action::Created
        } else {
            self.client.update_task(
                &id,
                UpdateTaskOptions {
                    task_type: Some(task_type),
                    dbrps: Some(program.dbrps()),
                    tickscript: Some(script),
                    ..Default::default()
                },
            )?;
            self.reload_task(&id)?;
            Action::Updated
        };

        Ok(Loaded {
            resource: Resource::Task,
            id,
            action,
        })
    }

    fn load_template(
        &mut self,
        path: &Path,
        parsed: &mut HashMap<String, Program>,
    ) -> Result<Loaded, LoadError> {
        let script = read_file(path)?;
        let id = file_id(path);
        let program = parse_file(path, &script)?;

        let task_type = program.task_type();
        if task_type == TaskType::Invalid {
            return Err(LoadError::InvalidTaskType { id });
        }

        let options = TemplateOptions {
            id: id.clone(),
            task_type,
            tickscript: script,
        };
        let action = if self.client.template(&id)?.is_none() {
            self.client.create_template(options)?;
            Action::Created
        } else {
            self.client.update_template(options)?;
            Action::Updated
        };

        parsed.insert(id.clone(), program);
        Ok(Loaded {
            resource: Resource::Template,
            id,
            action,
        })
    }

    /// Checks vars against the template's typed declarations when the
    /// template was parsed in this run.
    fn check_vars(
        id: &str,
        vars: &TaskVars,
        parsed: &HashMap<String, Program>,
    ) -> Result<(), LoadError> {
        let declared: HashMap<&str, _> = parsed
            .get(&vars.template_id)
            .map(|program| program.template_vars().into_iter().collect())
            .unwrap_or_default();

        for (name, var) in &vars.vars {
            if let Some(expected) = declared.get(name.as_str()) {
                if *expected != var.var_type {
                    return Err(LoadError::VarTypeMismatch {
                        id: id.to_string(),
                        name: name.clone(),
                        expected: *expected,
                        found: var.var_type,
                    });
                }
            }
            if !var.value_matches_type() {
                return Err(LoadError::InvalidVarValue {
                    id: id.to_string(),
                    name: name.clone(),
                    var_type: var.var_type,
                });
            }
        }
        Ok(())
    }

    fn load_vars(
        &mut self,
        path: &Path,
        parsed: &HashMap<String, Program>,
    ) -> Result<Loaded, LoadError> {
        let data = read_file(path)?;
        let id = file_id(path);
        let vars: TaskVars = decode(path, &data)?;
        Self::check_vars(&id, &vars, parsed)?;

        let task_type = parsed.get(&vars.template_id).map(Program::task_type);
        let action = if self.client.task(&id)?.is_none() {
            self.client.create_task(CreateTaskOptions {
                id: id.clone(),
                template_id: Some(vars.template_id),
                task_type,
                dbrps: vars.dbrps,
                tickscript: None,
                status: TaskStatus::Enabled,
                vars: vars.vars,
            })?;
            Action::Created
        } else {
            self.client.update_task(
                &id,
                UpdateTaskOptions {
                    template_id: Some(vars.template_id),
                    task_type,
                    dbrps: Some(vars.dbrps),
                    vars: Some(vars.vars),
                    ..Default::default()
                },
            )?;
            self.reload_task(&id)?;
            Action::Updated
        };

        Ok(Loaded {
            resource: Resource::Task,
            id,
            action,
        })
    }

    fn load_handler(&mut self, path: &Path) -> Result<Loaded, LoadError> {
        let data = read_file(path)?;
        let handler: TopicHandler = decode(path, &data)?;
        let id = format!("{}/{}", handler.topic, handler.id);

        let action = if self.client.topic_handler(&handler.topic, &handler.id)?.is_none() {
            self.client.create_topic_handler(handler)?;
            Action::Created
        } else {
            self.client.replace_topic_handler(handler)?;
            Action::Updated
        };

        Ok(Loaded {
            resource: Resource::TopicHandler,
            id,
            action,
        })
    }
}
