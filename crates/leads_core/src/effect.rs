use crate::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenStream {
        generation: Generation,
        request_id: String,
    },
    CloseStream {
        generation: Generation,
    },
    FetchLeads {
        generation: Generation,
        campaign_ids: Vec<String>,
    },
}
