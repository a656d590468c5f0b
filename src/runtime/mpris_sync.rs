use crate::mpris::MprisHandle;
use crate::output::AudioOutput;
use crate::playback::PlaybackController;

pub fn update_mpris<O: AudioOutput>(mpris: &MprisHandle, controller: &PlaybackController<O>) {
    mpris.sync(&controller.snapshot(), controller.current_track());
}
