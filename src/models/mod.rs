//! Models module for the SDK
//!
//! Typed records for parsed job documents and for everything the extractors
//! derive from them.

pub mod context;
pub mod corpus;
pub mod graph;
pub mod job;
pub mod performance;
pub mod quality;
pub mod sql;
pub mod transaction;
pub mod transform;

pub use context::{ContextCategory, ContextClassification, ContextMappingEntry, ContextVariable};
pub use corpus::{
    AggregateDocument, ExtractionMetadata, JobRole, JobSummary, MigrationRecommendations,
    TableAnalysis, TableUsage, ValidationQuery,
};
pub use graph::{DependencyGraph, FlowEdge, GraphComponent, GraphEdge};
pub use job::{
    ComponentNode, Connection, ContextDefinition, ContextParameter, ElementParameter,
    ElementValue, GlobalMapKey, JobDocument, MapperData, MapperEntry, MapperInputTable,
    MapperOutputTable, MapperVarTable, MetadataColumn, Position, SchemaMetadata,
};
pub use performance::{
    BatchSettings, CommitMode, ConnectionMetadata, MemorySettings, ParallelHints, Parallelism,
    PerformanceHints,
};
pub use quality::{DataQualityRule, ErrorPattern, ErrorTrigger, LogMode};
pub use sql::{SqlExtraction, SqlOperation, SqlQueryEntry, StatementKind};
pub use transaction::{TerminalKind, TransactionGroup, TransactionOperation, TransactionSummary};
pub use transform::{
    InputField, JoinKeyCondition, LookupDescriptor, OutputField, TransformExpression,
    TransformFilter, TransformStructure, TransformVariable, TransformationEntry,
};
