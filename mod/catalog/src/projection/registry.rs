//! The static projection tables and the `(kind, operation)` lookup.
//!
//! Operations without a registered projection fall back to the kind's
//! full-field default, so a new operation never silently drops data.

use crate::model::{LifeSituationKind, ProcessStatus, ServiceType};

use super::{EntityKind, Field, FieldKind, Operation, Projection};

// ── ProcessData (nested-only) ───────────────────────────────────────

pub static PROCESS_DATA: Projection = Projection {
    name: "process_data",
    fields: &[
        Field::new("client_value", "Client value", FieldKind::String)
            .help("What the client receives from this process"),
        Field::new("input_data", "Input data", FieldKind::String),
        Field::new("output_data", "Output data", FieldKind::String),
        Field::new(
            "related_processes",
            "Related processes",
            FieldKind::ReferenceList(EntityKind::Process),
        )
        .help("Advisory links to other processes, for display only"),
        Field::new("group", "Group", FieldKind::String),
    ],
};

// ── LifeSituation ───────────────────────────────────────────────────

static LIFE_SITUATION_DEFAULT: Projection = Projection {
    name: "life_situation.default",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("name", "Life situation", FieldKind::Choice(LifeSituationKind::CHOICES))
            .required(),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
        Field::new("organization", "Organization", FieldKind::String).read_only(),
        Field::new("owner", "Owner", FieldKind::String).read_only(),
        Field::new("created_at", "Created at", FieldKind::DateTime).read_only(),
        Field::new("updated_at", "Updated at", FieldKind::DateTime).read_only(),
    ],
};

static LIFE_SITUATION_LIST: Projection = Projection {
    name: "life_situation.list",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("name", "Life situation", FieldKind::Choice(LifeSituationKind::CHOICES))
            .read_only()
            .as_label(),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
        Field::new("services", "Services", FieldKind::NestedList(&SERVICE_FLAT)).read_only(),
    ],
};

static LIFE_SITUATION_RETRIEVE: Projection = Projection {
    name: "life_situation.retrieve",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
        Field::new("name", "Life situation", FieldKind::Choice(LifeSituationKind::CHOICES))
            .required(),
    ],
};

static LIFE_SITUATION_CREATE: Projection = Projection {
    name: "life_situation.create",
    fields: &[
        Field::new("name", "Life situation", FieldKind::Choice(LifeSituationKind::CHOICES))
            .required(),
        Field::new("identifier", "Identifier", FieldKind::String)
            .read_only()
            .help("Computed by the server at creation time"),
    ],
};

static LIFE_SITUATION_UPDATE: Projection = Projection {
    name: "life_situation.update",
    fields: &[
        Field::new("name", "Life situation", FieldKind::Choice(LifeSituationKind::CHOICES))
            .required(),
    ],
};

static LIFE_SITUATION_OPS: [(Operation, &Projection); 4] = [
    (Operation::List, &LIFE_SITUATION_LIST),
    (Operation::Retrieve, &LIFE_SITUATION_RETRIEVE),
    (Operation::Create, &LIFE_SITUATION_CREATE),
    (Operation::Update, &LIFE_SITUATION_UPDATE),
];

// ── Service ─────────────────────────────────────────────────────────

/// Flat shape shared by `list` and `retrieve`, and reused as the element
/// projection when LifeSituation lists embed their Services.
static SERVICE_FLAT: Projection = Projection {
    name: "service.retrieve",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("service_type", "Type", FieldKind::Choice(ServiceType::CHOICES))
            .required()
            .as_label(),
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("regulating_act", "Regulating act", FieldKind::String).max_length(512),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
    ],
};

static SERVICE_DEFAULT: Projection = Projection {
    name: "service.default",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("service_type", "Type", FieldKind::Choice(ServiceType::CHOICES)).required(),
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("regulating_act", "Regulating act", FieldKind::String).max_length(512),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
        Field::new(
            "life_situation",
            "Life situation",
            FieldKind::Reference(EntityKind::LifeSituation),
        )
        .read_only(),
        Field::new("organization", "Organization", FieldKind::String).read_only(),
        Field::new("owner", "Owner", FieldKind::String).read_only(),
        Field::new("created_at", "Created at", FieldKind::DateTime).read_only(),
        Field::new("updated_at", "Updated at", FieldKind::DateTime).read_only(),
    ],
};

static SERVICE_CREATE: Projection = Projection {
    name: "service.create",
    fields: &[
        Field::new("service_type", "Type", FieldKind::Choice(ServiceType::CHOICES)).required(),
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("regulating_act", "Regulating act", FieldKind::String).max_length(512),
        Field::new(
            "life_situation",
            "Life situation",
            FieldKind::Reference(EntityKind::LifeSituation),
        )
        .required(),
        Field::new("identifier", "Identifier", FieldKind::String)
            .read_only()
            .help("Computed by the server at creation time"),
    ],
};

static SERVICE_UPDATE: Projection = Projection {
    name: "service.update",
    fields: &[
        Field::new("service_type", "Type", FieldKind::Choice(ServiceType::CHOICES)).required(),
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("regulating_act", "Regulating act", FieldKind::String).max_length(512),
    ],
};

static SERVICE_OPS: [(Operation, &Projection); 4] = [
    (Operation::List, &SERVICE_FLAT),
    (Operation::Retrieve, &SERVICE_FLAT),
    (Operation::Create, &SERVICE_CREATE),
    (Operation::Update, &SERVICE_UPDATE),
];

// ── Process ─────────────────────────────────────────────────────────

static PROCESS_DEFAULT: Projection = Projection {
    name: "process.default",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("status", "Status", FieldKind::Choice(ProcessStatus::CHOICES)),
        Field::new("is_internal_client", "Internal client", FieldKind::Boolean),
        Field::new("is_external_client", "External client", FieldKind::Boolean),
        Field::new("responsible_authority", "Responsible authority", FieldKind::String)
            .max_length(512),
        Field::new("department", "Department", FieldKind::String).max_length(512),
        Field::new("is_digital_format", "Digital format", FieldKind::Boolean),
        Field::new("is_non_digital_format", "Non-digital format", FieldKind::Boolean),
        Field::new("digital_format_link", "Digital format link", FieldKind::String)
            .max_length(2048),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
        Field::new("service", "Service", FieldKind::Reference(EntityKind::Service)).read_only(),
        Field::new("organization", "Organization", FieldKind::String).read_only(),
        Field::new("owner", "Owner", FieldKind::String).read_only(),
        Field::new("process_data", "Process data", FieldKind::Nested(&PROCESS_DATA)).read_only(),
        Field::new("created_at", "Created at", FieldKind::DateTime).read_only(),
        Field::new("updated_at", "Updated at", FieldKind::DateTime).read_only(),
    ],
};

static PROCESS_RETRIEVE: Projection = Projection {
    name: "process.retrieve",
    fields: &[
        Field::new("id", "Id", FieldKind::String).read_only(),
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("status", "Status", FieldKind::Choice(ProcessStatus::CHOICES)),
        Field::new("is_internal_client", "Internal client", FieldKind::Boolean),
        Field::new("is_external_client", "External client", FieldKind::Boolean),
        Field::new("responsible_authority", "Responsible authority", FieldKind::String)
            .max_length(512),
        Field::new("department", "Department", FieldKind::String).max_length(512),
        Field::new("is_digital_format", "Digital format", FieldKind::Boolean),
        Field::new("is_non_digital_format", "Non-digital format", FieldKind::Boolean),
        Field::new("digital_format_link", "Digital format link", FieldKind::String)
            .max_length(2048),
        Field::new("identifier", "Identifier", FieldKind::String).read_only(),
        Field::new("process_data", "Process data", FieldKind::Nested(&PROCESS_DATA)),
    ],
};

static PROCESS_CREATE: Projection = Projection {
    name: "process.create",
    fields: &[
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("service", "Service", FieldKind::Reference(EntityKind::Service)).required(),
        Field::new("status", "Status", FieldKind::Choice(ProcessStatus::CHOICES)),
        Field::new("is_internal_client", "Internal client", FieldKind::Boolean),
        Field::new("is_external_client", "External client", FieldKind::Boolean),
        Field::new("responsible_authority", "Responsible authority", FieldKind::String)
            .max_length(512),
        Field::new("department", "Department", FieldKind::String).max_length(512),
        Field::new("is_digital_format", "Digital format", FieldKind::Boolean),
        Field::new("is_non_digital_format", "Non-digital format", FieldKind::Boolean),
        Field::new("digital_format_link", "Digital format link", FieldKind::String)
            .max_length(2048),
        Field::new("identifier", "Identifier", FieldKind::String)
            .read_only()
            .help("Computed by the server at creation time"),
    ],
};

static PROCESS_UPDATE: Projection = Projection {
    name: "process.update",
    fields: &[
        Field::new("name", "Name", FieldKind::String).required().max_length(255),
        Field::new("status", "Status", FieldKind::Choice(ProcessStatus::CHOICES)),
        Field::new("is_internal_client", "Internal client", FieldKind::Boolean),
        Field::new("is_external_client", "External client", FieldKind::Boolean),
        Field::new("responsible_authority", "Responsible authority", FieldKind::String)
            .max_length(512),
        Field::new("department", "Department", FieldKind::String).max_length(512),
        Field::new("is_digital_format", "Digital format", FieldKind::Boolean),
        Field::new("is_non_digital_format", "Non-digital format", FieldKind::Boolean),
        Field::new("digital_format_link", "Digital format link", FieldKind::String)
            .max_length(2048),
        Field::new("process_data", "Process data", FieldKind::Nested(&PROCESS_DATA)),
    ],
};

static PROCESS_OPS: [(Operation, &Projection); 3] = [
    (Operation::Retrieve, &PROCESS_RETRIEVE),
    (Operation::Create, &PROCESS_CREATE),
    (Operation::Update, &PROCESS_UPDATE),
];

// ── Lookup ──────────────────────────────────────────────────────────

/// The projections registered for a kind, in registration order.
pub fn registered(kind: EntityKind) -> &'static [(Operation, &'static Projection)] {
    match kind {
        EntityKind::LifeSituation => &LIFE_SITUATION_OPS,
        EntityKind::Service => &SERVICE_OPS,
        EntityKind::Process => &PROCESS_OPS,
    }
}

/// The full-field fallback projection for a kind.
pub fn default_for(kind: EntityKind) -> &'static Projection {
    match kind {
        EntityKind::LifeSituation => &LIFE_SITUATION_DEFAULT,
        EntityKind::Service => &SERVICE_DEFAULT,
        EntityKind::Process => &PROCESS_DEFAULT,
    }
}

/// Resolve the projection for `(kind, operation)`, falling back to the
/// kind's full-field default when the operation has none registered.
pub fn projection_for(kind: EntityKind, operation: Operation) -> &'static Projection {
    registered(kind)
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, p)| *p)
        .unwrap_or_else(|| default_for(kind))
}
