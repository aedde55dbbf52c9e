//! Interfaces to the excluded presentation collaborators.
//!
//! Rendering, sound and the visual part factory live outside this core.
//! The core calls them through these traits, injected where needed as
//! context parameters; the null implementations let everything run
//! headless (tests, dedicated servers).

use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec3Fixed};
use crate::object::ObjectCreateParams;

/// Particle classes the core can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Welding sparks.
    Spark,
    /// Smoke puff.
    Smoke,
    /// Flame jet.
    Flame,
    /// Lens glint.
    Glint,
}

/// Sound classes the core can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    /// Factory machinery.
    Factory,
    /// Weapon discharge.
    Fire,
    /// Explosion.
    Explosion,
    /// Shield hum.
    Shield,
    /// Background music track.
    Music,
}

/// Particle system interface (rendering engine collaborator).
pub trait ParticleSink {
    /// Spawn a particle effect.
    fn create_particle(
        &mut self,
        position: Vec3Fixed,
        velocity: Vec3Fixed,
        size: Fixed,
        kind: ParticleKind,
        duration: Fixed,
    );
}

/// Sound playback interface (audio collaborator).
pub trait SoundSink {
    /// Start a sound; returns a channel handle for envelopes.
    fn play(
        &mut self,
        kind: SoundKind,
        position: Vec3Fixed,
        volume: Fixed,
        pitch: Fixed,
        looped: bool,
    ) -> u32;

    /// Append a volume/pitch envelope segment to a channel.
    fn add_envelope(&mut self, channel: u32, volume: Fixed, pitch: Fixed, duration: Fixed);

    /// Drop all queued envelope segments on a channel.
    fn flush_envelope(&mut self, channel: u32);
}

/// Visual part factory (geometry collaborator).
///
/// The registry delegates here before registering a new object; a
/// factory that cannot build the requested type makes the whole creation
/// fail, never producing a half-built object.
pub trait GeometryFactory {
    /// Build the visual representation for an object about to be
    /// registered.
    fn build(&mut self, params: &ObjectCreateParams) -> Result<()>;
}

/// No-op particle sink for headless runs.
#[derive(Debug, Default)]
pub struct NullParticles;

impl ParticleSink for NullParticles {
    fn create_particle(
        &mut self,
        _position: Vec3Fixed,
        _velocity: Vec3Fixed,
        _size: Fixed,
        _kind: ParticleKind,
        _duration: Fixed,
    ) {
    }
}

/// No-op sound sink for headless runs.
#[derive(Debug, Default)]
pub struct NullSound;

impl SoundSink for NullSound {
    fn play(
        &mut self,
        _kind: SoundKind,
        _position: Vec3Fixed,
        _volume: Fixed,
        _pitch: Fixed,
        _looped: bool,
    ) -> u32 {
        0
    }

    fn add_envelope(&mut self, _channel: u32, _volume: Fixed, _pitch: Fixed, _duration: Fixed) {}

    fn flush_envelope(&mut self, _channel: u32) {}
}

/// Geometry factory that accepts every concrete type.
#[derive(Debug, Default)]
pub struct NullGeometry;

impl GeometryFactory for NullGeometry {
    fn build(&mut self, _params: &ObjectCreateParams) -> Result<()> {
        Ok(())
    }
}

/// Geometry factory that rejects everything; creation-failure tests use
/// this.
#[derive(Debug, Default)]
pub struct FailingGeometry;

impl GeometryFactory for FailingGeometry {
    fn build(&mut self, params: &ObjectCreateParams) -> Result<()> {
        Err(GameError::CreateFailed(format!(
            "{:?}",
            params.object_type
        )))
    }
}
