/// Macro to register games in the registry with automatic launcher generation
///
/// Usage in games/mod.rs:
/// ```ignore
/// register_games! {
///     fire => {
///         game: FireGame,
///         id: "fire",
///         name: "Letter Fire",
///         description: "Shoot down falling letters",
///         author: "letterterm",
///         options: [Difficulty, SpeedLevel, LetterCase, Duration]
///     },
///     mole => {
///         game: MoleGame,
///         id: "mole",
///         name: "Letter Mole",
///         description: "Whack the moles by their letters",
///         author: "letterterm",
///         options: []
///     }
/// }
/// ```
///
/// Every game type must provide `fn load(&Settings, &Storage) -> Self`.
#[macro_export]
macro_rules! register_games {
    (
        $(
            $module:ident => {
                game: $game:ident,
                id: $id:expr,
                name: $name:expr,
                description: $desc:expr,
                author: $author:expr,
                options: [$($opt:ident),* $(,)?]
            }
        ),* $(,)?
    ) => {
        /// Get all available games with their metadata and launchers
        pub fn get_all_games() -> Vec<GameRegistry> {
            vec![
                $(
                    GameRegistry {
                        info: GameInfo {
                            id: $id,
                            name: $name,
                            description: $desc,
                            author: $author,
                            options: &[$($crate::core::settings::OptionKind::$opt),*],
                        },
                        launcher: |settings, storage, terminal| {
                            Box::pin(async move {
                                use $crate::core::engine::Engine;
                                use $crate::games::$module::$game;

                                tracing::info!(game = $id, "launching");
                                let game = $game::load(&settings, &storage);
                                Engine::new(game, storage).run(terminal).await
                            })
                        },
                    }
                ),*
            ]
        }

        /// Get a game by ID
        pub fn get_game(id: &str) -> Option<GameRegistry> {
            get_all_games().into_iter().find(|g| g.info.id == id)
        }
    };
}
