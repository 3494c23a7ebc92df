use lobby_room::ChatRoom;

#[derive(Clone)]
pub struct AppState {
    room: ChatRoom,
}

impl AppState {
    pub fn new(room: ChatRoom) -> Self {
        Self { room }
    }

    pub fn room(&self) -> &ChatRoom {
        &self.room
    }
}
