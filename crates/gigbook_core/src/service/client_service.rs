//! Client use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for client records.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::client::{Client, ClientId};
use crate::repo::client_repo::{ClientListQuery, ClientRepository};
use crate::repo::RepoResult;

/// Use-case service wrapper for client CRUD operations.
pub struct ClientService<R: ClientRepository> {
    repo: R,
}

impl<R: ClientRepository> ClientService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new client record.
    pub fn create_client(&self, client: &Client) -> RepoResult<ClientId> {
        self.repo.create_client(client)
    }

    /// Creates a client from just a name and e-mail with default terms.
    pub fn register_client(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> RepoResult<ClientId> {
        let client = Client::new(name, email);
        self.repo.create_client(&client)
    }

    /// Updates an existing client by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_client(&self, client: &Client) -> RepoResult<()> {
        self.repo.update_client(client)
    }

    /// Gets one client by ID.
    pub fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        self.repo.get_client(id)
    }

    /// Lists clients using filter and pagination options.
    pub fn list_clients(&self, query: &ClientListQuery) -> RepoResult<Vec<Client>> {
        self.repo.list_clients(query)
    }

    /// Deletes a client by ID.
    pub fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        self.repo.delete_client(id)
    }
}
