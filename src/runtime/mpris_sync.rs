use crate::mpris::MprisHandle;
use crate::playback::PlaybackController;

pub fn update_mpris(mpris: &MprisHandle, controller: &PlaybackController) {
    mpris.set_track_metadata(controller.current_track());
    mpris.set_playback(controller.state());
}
