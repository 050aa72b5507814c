mod auth_tests;
mod car_tests;
