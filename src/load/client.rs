use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyzer::TaskType;
use crate::ast::VarType;
use crate::dbrp::Dbrp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enabled,
    Disabled,
}

/// A task variable supplied to a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    #[serde(rename = "type")]
    pub var_type: VarType,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Var {
    /// Whether the JSON value has the shape its declared type needs.
    pub fn value_matches_type(&self) -> bool {
        use serde_json::Value;
        match (self.var_type, &self.value) {
            (VarType::Int, Value::Number(n)) => n.is_i64(),
            (VarType::Float, Value::Number(_)) => true,
            (VarType::Bool, Value::Bool(_)) => true,
            (
                VarType::String | VarType::Duration | VarType::Lambda | VarType::Regex,
                Value::String(_),
            ) => true,
            (VarType::List, Value::Array(_)) => true,
            (VarType::Star, _) => true,
            _ => false,
        }
    }
}

/// Sidecar file binding a task to a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskVars {
    #[serde(rename = "template-id")]
    pub template_id: String,
    #[serde(default)]
    pub dbrps: Vec<Dbrp>,
    #[serde(default)]
    pub vars: BTreeMap<String, Var>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub dbrps: Vec<Dbrp>,
    #[serde(default)]
    pub tickscript: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub vars: BTreeMap<String, Var>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskOptions {
    pub id: String,
    pub template_id: Option<String>,
    pub task_type: Option<TaskType>,
    pub dbrps: Vec<Dbrp>,
    pub tickscript: Option<String>,
    pub status: TaskStatus,
    pub vars: BTreeMap<String, Var>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateTaskOptions {
    pub template_id: Option<String>,
    pub task_type: Option<TaskType>,
    pub dbrps: Option<Vec<Dbrp>>,
    pub tickscript: Option<String>,
    pub status: Option<TaskStatus>,
    pub vars: Option<BTreeMap<String, Var>>,
}

impl UpdateTaskOptions {
    pub fn status(status: TaskStatus) -> Self {
        UpdateTaskOptions {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub tickscript: String,
}

/// Options to create or update a template; the template is replaced whole.
pub type TemplateOptions = Template;

/// Alert handler bound to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicHandler {
    pub topic: String,
    pub id: String,
    pub kind: String,
    #[serde(rename = "match", default, skip_serializing_if = "String::is_empty")]
    pub match_expr: String,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("task-management API error: {0}")]
    Api(String),
}

/// Task-management API used by the loader.
///
/// Lookups return `Ok(None)` for missing resources; only transport or API
/// failures are errors.
pub trait TaskClient {
    fn task(&self, id: &str) -> Result<Option<Task>, ClientError>;
    fn create_task(&mut self, options: CreateTaskOptions) -> Result<Task, ClientError>;
    fn update_task(&mut self, id: &str, options: UpdateTaskOptions) -> Result<Task, ClientError>;

    fn template(&self, id: &str) -> Result<Option<Template>, ClientError>;
    fn create_template(&mut self, options: TemplateOptions) -> Result<Template, ClientError>;
    fn update_template(&mut self, options: TemplateOptions) -> Result<Template, ClientError>;

    fn topic_handler(&self, topic: &str, id: &str) -> Result<Option<TopicHandler>, ClientError>;
    fn create_topic_handler(&mut self, handler: TopicHandler) -> Result<TopicHandler, ClientError>;
    fn replace_topic_handler(&mut self, handler: TopicHandler)
    -> Result<TopicHandler, ClientError>;
}

impl<C: TaskClient + ?Sized> TaskClient for &mut C {
    fn task(&self, id: &str) -> Result<Option<Task>, ClientError> {
        (**self).task(id)
    }

    fn create_task(&mut self, options: CreateTaskOptions) -> Result<Task, ClientError> {
        (**self).create_task(options)
    }

    fn update_task(&mut self, id: &str, options: UpdateTaskOptions) -> Result<Task, ClientError> {
        (**self).update_task(id, options)
    }

    fn template(&self, id: &str) -> Result<Option<Template>, ClientError> {
        (**self).template(id)
    }

    fn create_template(&mut self, options: TemplateOptions) -> Result<Template, ClientError> {
        (**self).create_template(options)
    }

    fn update_template(&mut self, options: TemplateOptions) -> Result<Template, ClientError> {
        (**self).update_template(options)
    }

    fn topic_handler(&self, topic: &str, id: &str) -> Result<Option<TopicHandler>, ClientError> {
        (**self).topic_handler(topic, id)
    }

    fn create_topic_handler(&mut self, handler: TopicHandler) -> Result<TopicHandler, ClientError> {
        (**self).create_topic_handler(handler)
    }

    fn replace_topic_handler(
        &mut self,
        handler: TopicHandler,
    ) -> Result<TopicHandler, ClientError> {
        (**self).replace_topic_handler(handler)
    }
}

/// A mutating call received by [`MemoryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    CreateTask { id: String },
    UpdateTask { id: String, status: Option<TaskStatus> },
    CreateTemplate { id: String },
    UpdateTemplate { id: String },
    CreateTopicHandler { topic: String, id: String },
    ReplaceTopicHandler { topic: String, id: String },
}

impl fmt::Display for ClientCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCall::CreateTask { id } => write!(f, "create task {id}"),
            ClientCall::UpdateTask { id, status: None } => write!(f, "update task {id}"),
            ClientCall::UpdateTask {
                id,
                status: Some(TaskStatus::Enabled),
            } => write!(f, "enable task {id}"),
            ClientCall::UpdateTask {
                id,
                status: Some(TaskStatus::Disabled),
            } => write!(f, "disable task {id}"),
            ClientCall::CreateTemplate { id } => write!(f, "create template {id}"),
            ClientCall::UpdateTemplate { id } => write!(f, "update template {id}"),
            ClientCall::CreateTopicHandler { topic, id } => {
                write!(f, "create handler {id} on topic {topic}")
            }
            ClientCall::ReplaceTopicHandler { topic, id } => {
                write!(f, "replace handler {id} on topic {topic}")
            }
        }
    }
}

/// In-process task store. Keeps every resource in memory and records each
/// mutating call, which makes it usable as a dry-run target.
#[derive(Debug, Default)]
pub struct MemoryClient {
    tasks: BTreeMap<String, Task>,
    templates: BTreeMap<String, Template>,
    handlers: BTreeMap<(String, String), TopicHandler>,
    calls: Vec<ClientCall>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[ClientCall] {
        &self.calls
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }
}

impl TaskClient for MemoryClient {
    fn task(&self, id: &str) -> Result<Option<Task>, ClientError> {
        Ok(self.tasks.get(id).cloned())
    }

    fn create_task(&mut self, options: CreateTaskOptions) -> Result<Task, ClientError> {
        if self.tasks.contains_key(&options.id) {
            return Err(ClientError::AlreadyExists {
                kind: "task",
                id: options.id,
            });
        }

        let task = Task {
            id: options.id.clone(),
            template_id: options.template_id,
            task_type: options.task_type,
            dbrps: options.dbrps,
            tickscript: options.tickscript,
            status: options.status,
            vars: options.vars,
        };
        self.calls.push(ClientCall::CreateTask { id: options.id.clone() });
        self.tasks.insert(options.id, task.clone());
        Ok(task)
    }

    fn update_task(&mut self, id: &str, options: UpdateTaskOptions) -> Result<Task, ClientError> {
        let task = self.tasks.get_mut(id).ok_or_else(|| ClientError::NotFound {
            kind: "task",
            id: id.to_string(),
        })?;

        if let Some(template_id) = options.template_id {
            task.template_id = Some(template_id);
        }
        if let Some(task_type) = options.task_type {
            task.task_type = Some(task_type);
        }
        if let Some(dbrps) = options.dbrps {
            task.dbrps = dbrps;
        }
        if let Some(tickscript) = options.tickscript {
            task.tickscript = Some(tickscript);
        }
        if let Some(status) = options.status {
            task.status = status;
        }
        if let Some(vars) = options.vars {
            task.vars = vars;
        }

        let task = task.clone();
        self.calls.push(ClientCall::UpdateTask {
            id: id.to_string(),
            status: options.status,
        });
        Ok(task)
    }

    fn template(&self, id: &str) -> Result<Option<Template>, ClientError> {
        Ok(self.templates.get(id).cloned())
    }

    fn create_template(&mut self, options: TemplateOptions) -> Result<Template, ClientError> {
        if self.templates.contains_key(&options.id) {
            return Err(ClientError::AlreadyExists {
                kind: "template",
                id: options.id,
            });
        }
        self.calls.push(ClientCall::CreateTemplate { id: options.id.clone() });
        self.templates.insert(options.id.clone(), options.clone());
        Ok(options)
    }

    fn update_template(&mut self, options: TemplateOptions) -> Result<Template, ClientError> {
        if !self.templates.contains_key(&options.id) {
            return Err(ClientError::NotFound {
                kind: "template",
                id: options.id,
            });
        }
        self.calls.push(ClientCall::UpdateTemplate { id: options.id.clone() });
        self.templates.insert(options.id.clone(), options.clone());
        Ok(options)
    }

    fn topic_handler(&self, topic: &str, id: &str) -> Result<Option<TopicHandler>, ClientError> {
        Ok(self
            .handlers
            .get(&(topic.to_string(), id.to_string()))
            .cloned())
    }

    fn create_topic_handler(&mut self, handler: TopicHandler) -> Result<TopicHandler, ClientError> {
        let key = (handler.topic.clone(), handler.id.clone());
        if self.handlers.contains_key(&key) {
            return Err(ClientError::AlreadyExists {
                kind: "handler",
                id: handler.id,
            });
        }
        self.calls.push(ClientCall::CreateTopicHandler {
            topic: key.0.clone(),
            id: key.1.clone(),
        });
        self.handlers.insert(key, handler.clone());
        Ok(handler)
    }

    fn replace_topic_handler(
        &mut self,
        handler: TopicHandler,
    ) -> Result<TopicHandler, ClientError> {
        let key = (handler.topic.clone(), handler.id.clone());
        if !self.handlers.contains_key(&key) {
            return Err(ClientError::NotFound {
                kind: "handler",
                id: handler.id,
            });
        }
        self.calls.push(ClientCall::ReplaceTopicHandler {
            topic: key.0.clone(),
            id: key.1.clone(),
        });
        self.handlers.insert(key, handler.clone());
        Ok(handler)
    }
}
