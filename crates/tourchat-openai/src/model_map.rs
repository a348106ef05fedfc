use std::borrow::Cow;

use tourchat_core::model::{Model, OpenAiModel};

pub const GPT3_5_TURBO: &str = "gpt-3.5-turbo";
pub const GPT4_TURBO: &str = "gpt-4-turbo";
pub const GPT4_O: &str = "gpt-4o";
pub const GPT4_O_MINI: &str = "gpt-4o-mini";

pub(crate) fn map_model(model: &Model) -> Cow<'static, str> {
    match model {
        Model::Custom(custom) => Cow::Borrowed(*custom),
        Model::OpenAi(OpenAiModel::Gpt35Turbo) => GPT3_5_TURBO.into(),
        Model::OpenAi(OpenAiModel::Gpt4Turbo) => GPT4_TURBO.into(),
        Model::OpenAi(OpenAiModel::Gpt4o) => GPT4_O.into(),
        Model::OpenAi(OpenAiModel::Gpt4oMini) => GPT4_O_MINI.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_enumerated_and_custom_models() {
        assert_eq!(map_model(&OpenAiModel::Gpt4Turbo.into()), "gpt-4-turbo");
        assert_eq!(map_model(&Model::Custom("gpt-4.1")), "gpt-4.1");
    }
}
