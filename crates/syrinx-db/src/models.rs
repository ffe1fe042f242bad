/// Database row types. Payloads are the JSON form of a `Record`; decoding
/// happens in the backend so this layer stays free of model types.

pub struct EntityRow {
    pub kind: String,
    pub data: String,
}

pub struct RelationRow {
    pub item_key: String,
    pub kind: String,
    pub data: String,
}
