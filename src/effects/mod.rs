//! Effect contract, registry, and the built-in effect library.

pub mod advanced;
pub mod blur;
pub mod color;
pub mod effect;
pub mod geometric;
pub mod noise;
pub mod registry;
pub mod spatial;
pub mod weather;

pub use effect::{Category, Effect, EffectMeta, serialize_effect};
pub use registry::{
    EffectFactory, EffectProvider, EffectRegistry, create_default_effect, create_effect,
    effect_tags, refresh, register_provider,
};

use registry::EffectFactory as Factory;

macro_rules! factory {
    ($ty:ty) => {
        Factory {
            tag: <$ty>::TAG,
            ctor: || Box::new(<$ty>::default()),
        }
    };
}

/// Every effect type shipped with the crate.
pub fn builtin_factories() -> Vec<EffectFactory> {
    vec![
        factory!(geometric::HorizontalFlipEffect),
        factory!(geometric::VerticalFlipEffect),
        factory!(geometric::RotateEffect),
        factory!(geometric::SafeRotateEffect),
        factory!(spatial::RandomCropEffect),
        factory!(spatial::CenterCropEffect),
        factory!(spatial::RandomResizedCropEffect),
        factory!(color::BrightnessContrastEffect),
        factory!(color::BrightnessEffect),
        factory!(color::ContrastEffect),
        factory!(color::ExposureEffect),
        factory!(color::RGBShiftEffect),
        factory!(color::HueSaturationEffect),
        factory!(blur::BlurEffect),
        factory!(blur::GaussianBlurEffect),
        factory!(blur::MotionBlurEffect),
        factory!(blur::SharpenEffect),
        factory!(blur::UnsharpMaskEffect),
        factory!(noise::GaussianNoiseEffect),
        factory!(noise::SaltAndPepperNoiseEffect),
        factory!(noise::ImageCompressionEffect),
        factory!(weather::RandomRainEffect),
        factory!(weather::RandomFogEffect),
        factory!(weather::RandomSunFlareEffect),
        factory!(advanced::PerspectiveEffect),
    ]
}
