use std::sync::Arc;

use agentmem_core::{generate_memory_id, Record};
use agentmem_storage::{MemoryStore, StorageLayout};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::tool::{parse_args, Tool, ToolError};

const DEFAULT_TOP_K: usize = 5;
const MAX_ID_ATTEMPTS: usize = 8;

/// Storage handle shared by the memory tools. Built once at startup.
#[derive(Debug, Clone)]
pub struct MemoryContext {
    store: Arc<MemoryStore>,
}

impl MemoryContext {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn open(layout: StorageLayout) -> Self {
        Self::new(MemoryStore::open(layout))
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

/// The `memory.*` tool family, in listing order.
pub fn memory_tools(ctx: &MemoryContext) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(MemoryWriteTool::new(ctx.clone())),
        Arc::new(MemorySearchTool::new(ctx.clone())),
        Arc::new(MemoryGetTool::new(ctx.clone())),
    ]
}

#[derive(Debug, Deserialize)]
struct MemoryWriteInput {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct MemorySearchInput {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct MemoryGetInput {
    #[serde(default)]
    memory_id: Option<String>,
}

pub struct MemoryWriteTool {
    ctx: MemoryContext,
}

impl MemoryWriteTool {
    pub fn new(ctx: MemoryContext) -> Self {
        Self { ctx }
    }

    fn unused_id(&self) -> Result<String, ToolError> {
        let records = self.ctx.store().records();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_memory_id();
            if !records.exists(&id) {
                return Ok(id);
            }
            tracing::warn!(%id, "generated memory id already taken, retrying");
        }
        Err(ToolError::Failed(
            "could not allocate an unused memory id".to_string(),
        ))
    }
}

impl Tool for MemoryWriteTool {
    fn name(&self) -> &'static str {
        "memory.write"
    }

    fn description(&self) -> &'static str {
        "Write a memory item to the memory store"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The content to remember"
                },
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Optional tags for categorization"
                }
            },
            "required": ["content"]
        })
    }

    fn execute(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: MemoryWriteInput = parse_args(arguments)?;
        let content = args
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ToolError::InvalidArgument("content is required".to_string()))?;

        let record = Record::with_id(self.unused_id()?, content, args.tags.unwrap_or_default());
        self.ctx.store().insert(&record)?;
        tracing::info!(id = %record.id, tags = record.keywords.len(), "memory written");

        Ok(json!({
            "memory_id": record.id,
            "success": true
        }))
    }
}

pub struct MemorySearchTool {
    ctx: MemoryContext,
}

impl MemorySearchTool {
    pub fn new(ctx: MemoryContext) -> Self {
        Self { ctx }
    }
}

impl Tool for MemorySearchTool {
    fn name(&self) -> &'static str {
        "memory.search"
    }

    fn description(&self) -> &'static str {
        "Search for memories by keyword"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "default": DEFAULT_TOP_K
                }
            },
            "required": ["query"]
        })
    }

    fn execute(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: MemorySearchInput = parse_args(arguments)?;
        let query = match args.query {
            Some(query) if !query.trim().is_empty() => query,
            _ => return Ok(json!({"results": [], "count": 0})),
        };

        let top_k = args.top_k.unwrap_or(DEFAULT_TOP_K);
        let results = self
            .ctx
            .store()
            .search(&query, top_k)?
            .into_iter()
            .map(|record| {
                json!({
                    "id": record.id,
                    "content": record.content,
                    "keywords": record.keywords,
                })
            })
            .collect::<Vec<_>>();
        tracing::debug!(query = %query, top_k, hits = results.len(), "memory search");

        Ok(json!({
            "count": results.len(),
            "results": results
        }))
    }
}

pub struct MemoryGetTool {
    ctx: MemoryContext,
}

impl MemoryGetTool {
    pub fn new(ctx: MemoryContext) -> Self {
        Self { ctx }
    }
}

impl Tool for MemoryGetTool {
    fn name(&self) -> &'static str {
        "memory.get"
    }

    fn description(&self) -> &'static str {
        "Get a specific memory by ID"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "memory_id": {
                    "type": "string",
                    "description": "The memory ID"
                }
            },
            "required": ["memory_id"]
        })
    }

    fn execute(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: MemoryGetInput = parse_args(arguments)?;
        let memory_id = args
            .memory_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ToolError::InvalidArgument("memory_id is required".to_string()))?;

        let memory = self.ctx.store().get(&memory_id)?;
        Ok(json!({ "memory": memory }))
    }
}
