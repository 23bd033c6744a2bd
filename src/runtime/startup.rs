use std::env;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::audio::MediaPlayer;
use crate::catalog::{Catalog, SupabaseCatalog, Track};
use crate::config;
use crate::consent::{ConsentManager, ConsentStore};
use crate::download::{DirectorySaver, DownloadManager, Fetcher, HttpFetcher};
use crate::playback::{DiscardPlays, PlayCountRecorder, PlayCountWorker, PlaybackController};
use crate::session::{AuthBackend, SessionContext, SupabaseAuth};

/// Preference key the volume is remembered under.
pub const VOLUME_PREFERENCE: &str = "volume";

/// Long-lived collaborators the event loop drives.
pub struct Services {
    pub session: SessionContext,
    pub auth: Option<SupabaseAuth>,
    pub catalog: Option<Arc<dyn Catalog>>,
    pub plays: Option<PlayCountWorker>,
    pub media: MediaPlayer,
    pub downloads: DownloadManager,
    pub consent: ConsentManager,
}

pub struct Startup {
    pub services: Services,
    pub controller: PlaybackController,
    pub tracks: Vec<Track>,
    pub volume: f32,
    /// Something the user should see in the status line right away.
    pub notice: Option<String>,
}

pub fn start(settings: &config::Settings) -> Result<Startup, Box<dyn std::error::Error>> {
    let session = SessionContext::new();
    let auth = match SupabaseAuth::new(&settings.catalog) {
        Ok(auth) => Some(auth),
        Err(e) => {
            warn!("admin sign-in unavailable: {e}");
            None
        }
    };
    if let Some(auth) = auth.as_ref() {
        admin_login(settings, &session, auth);
    }

    let mut notice = None;
    let catalog: Option<Arc<dyn Catalog>> =
        match SupabaseCatalog::new(&settings.catalog, session.clone()) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                warn!("catalog unavailable: {e}");
                notice = Some(format!("Catalog unavailable: {e}"));
                None
            }
        };

    let tracks = match catalog.as_ref().map(|c| c.list_tracks()) {
        Some(Ok(tracks)) => {
            info!("loaded {} tracks", tracks.len());
            tracks
        }
        Some(Err(e)) => {
            warn!("could not list tracks: {e}");
            notice = Some(format!("Could not load tracks: {e}"));
            Vec::new()
        }
        None => Vec::new(),
    };

    let plays = catalog.clone().map(PlayCountWorker::spawn);
    let recorder: Box<dyn PlayCountRecorder> = match plays.as_ref() {
        Some(worker) => Box::new(worker.recorder()),
        None => Box::new(DiscardPlays),
    };
    let controller = PlaybackController::new(recorder);

    let consent = ConsentManager::open(settings.consent_store_path().map(ConsentStore::new));
    let volume = consent
        .user_preference(VOLUME_PREFERENCE)
        .and_then(|v| v.parse::<f32>().ok())
        .filter(|v| (0.0..=1.0).contains(v))
        .unwrap_or(settings.audio.initial_volume);

    let load_timeout = Duration::from_secs(settings.audio.load_timeout_secs);
    let media_fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_timeout(load_timeout)?);
    let media = MediaPlayer::new(media_fetcher, volume);

    let saver = DirectorySaver::new(settings.download_dir());
    info!("downloads go to {}", saver.dir().display());
    let downloads = DownloadManager::new(
        Arc::new(HttpFetcher::new()?),
        Arc::new(saver),
        settings.downloads.chunk_size,
        Duration::from_millis(settings.downloads.status_reset_ms),
    );

    Ok(Startup {
        services: Services {
            session,
            auth,
            catalog,
            plays,
            media,
            downloads,
            consent,
        },
        controller,
        tracks,
        volume,
        notice,
    })
}

/// Sign in as admin when an email is configured and its password is in the environment.
fn admin_login(settings: &config::Settings, session: &SessionContext, auth: &dyn AuthBackend) {
    let Some(email) = settings.auth.admin_email.as_deref() else {
        return;
    };
    let Ok(password) = env::var(&settings.auth.password_env) else {
        warn!(
            "auth.admin_email is set but {} is not; staying anonymous",
            settings.auth.password_env
        );
        return;
    };
    match session.login(auth, email, &password) {
        Ok(user) => info!("signed in as {}", user.email),
        Err(e) => warn!("admin sign-in failed: {e}"),
    }
}

impl Services {
    /// Stop background work and end the admin session.
    pub fn shutdown(self, settings: &config::Settings) {
        self.media.quit_softly(settings.audio.quit_fade_out_ms);
        if let Some(plays) = self.plays {
            plays.shutdown();
        }
        if let Some(auth) = self.auth.as_ref()
            && self.session.is_logged_in()
        {
            self.session.logout(auth);
        }
    }
}
