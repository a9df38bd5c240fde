//! HTTP clients for the services the logistics tools talk to.
//!
//! Each client builds one request, sends it, and decodes the response.
//! No retries, pagination or caching happen here.

pub mod airtable;
pub mod error;
pub mod formula;
pub mod http;
pub mod notion;
pub mod slack;

pub use airtable::{AirtableClient, DeletedRecord, ListRecords, Record, Table};
pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, ApiClientBuilder};
pub use notion::{DataSourceQuery, NotionClient, Page, QueryResponse, SortDirection};
pub use slack::{Block, BlockElement, ButtonStyle, PostMessage, PostedMessage, SlackClient, TextObject};
