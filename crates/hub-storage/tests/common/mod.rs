//! Shared fixtures for hub-storage integration tests.

use std::sync::Arc;

use hub_core::{NewProposal, NewUser, Proposal, Role, User, UserId};
use hub_storage::{DocumentStore, MemoryStore, RedbStore};

/// Every backend the suite runs against.
pub fn backends() -> Vec<Arc<dyn DocumentStore>> {
    vec![
        Arc::new(MemoryStore::new()),
        Arc::new(RedbStore::in_memory().unwrap()),
    ]
}

/// A user with a placeholder hash.
pub fn user(name: &str, role: Role) -> User {
    let input = NewUser {
        name: name.to_string(),
        email: format!("{}@uni.edu", name.to_lowercase()),
        password: "correct horse".to_string(),
        role: Some(role),
        department: None,
        student_id: None,
    };
    User::create(input, "$argon2id$placeholder".to_string(), role)
}

/// A pending proposal owned by `student`.
pub fn proposal(student: UserId, supervisor: UserId, title: &str) -> Proposal {
    Proposal::create(
        student,
        NewProposal {
            title: title.to_string(),
            summary: "Summary".to_string(),
            objectives: vec![],
            category: None,
            supervisor,
            attachments: vec![],
        },
    )
}
