pub mod export_frames_use_case;
